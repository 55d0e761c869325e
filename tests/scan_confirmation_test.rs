#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use barcode_confirm::{
        BarcodeFormat, Classification, DecodeAttempt, ReferenceSet, ScanConfirmationEngine, ScanOptions,
        REQUIRED_FRAMES,
    };

    // Helper turning a compact frame list into decode attempts; "" is an empty frame
    fn frames(codes: &[&str]) -> Vec<DecodeAttempt> {
        codes.iter()
            .map(|code| DecodeAttempt::detected(*code, BarcodeFormat::Ean13))
            .collect()
    }

    fn run(reference: &[&str], codes: &[&str]) -> (ScanConfirmationEngine, Vec<Classification>) {
        let mut engine = ScanConfirmationEngine::with_reference(
            ScanOptions::default(),
            ReferenceSet::from_codes(reference.iter().copied()),
        );
        let results = frames(codes).iter().map(|attempt| engine.observe(attempt)).collect();
        (engine, results)
    }

    #[test_case(&["A"], Classification::FoundInReference("A".into()); "code in reference")]
    #[test_case(&["Z"], Classification::NotInReference("A".into()); "code not in reference")]
    #[test_case(&[], Classification::NotInReference("A".into()); "reference not loaded")]
    fn test_three_agreeing_frames_confirm(reference: &[&str], expected: Classification) {
        let (_, results) = run(reference, &["A", "A", "A"]);
        assert_eq!(results, vec![Classification::Pending, Classification::Pending, expected]);
    }

    #[test_case(&["A", "A", "B", "A", "A", "A"], 5; "interrupted run")]
    #[test_case(&["B", "A", "A", "A"], 3; "leading other code")]
    #[test_case(&["A", "", "", "A", "", "A"], 5; "empty frames between detections")]
    fn test_confirmation_frame(codes: &[&str], confirming_index: usize) {
        let (_, results) = run(&[], codes);

        for (index, result) in results.iter().enumerate() {
            if index == confirming_index {
                assert_eq!(result, &Classification::NotInReference("A".into()));
            } else {
                assert!(result.is_pending(), "frame {} should be pending, got {:?}", index, result);
            }
        }
    }

    #[test]
    fn test_code_is_confirmed_only_when_it_fills_the_window() {
        // A appears three times but never three in a row
        let (engine, results) = run(&[], &["A", "B", "A", "B", "A", "B"]);
        assert!(results.iter().all(Classification::is_pending));
        assert!(engine.accepted().is_empty());
    }

    #[test]
    fn test_repeat_confirmations_are_already_scanned() {
        let (engine, results) = run(&["A"], &["A"; 9]);

        let confirmed: Vec<&Classification> = results.iter().filter(|r| !r.is_pending()).collect();
        assert_eq!(confirmed, vec![
            &Classification::FoundInReference("A".into()),
            &Classification::AlreadyScanned("A".into()),
            &Classification::AlreadyScanned("A".into()),
        ]);
        assert_eq!(engine.accepted().len(), 1);
        assert_eq!(engine.stats().found_in_reference, 1);
        assert_eq!(engine.stats().duplicates, 2);
    }

    #[test]
    fn test_window_after_fourth_frame() {
        let (engine, results) = run(&[], &["A", "A", "A", "A"]);
        assert_eq!(results[3], Classification::Pending);
        assert_eq!(engine.window().to_vec(), vec!["A".to_string()]);
        assert!(engine.window().len() <= REQUIRED_FRAMES);
    }

    #[test]
    fn test_multiple_codes_in_one_session() {
        let (engine, results) = run(&["B"], &["A", "A", "A", "B", "B", "B", "C", "C", "C", "A", "A", "A"]);

        let confirmed: Vec<Classification> = results.into_iter().filter(|r| !r.is_pending()).collect();
        assert_eq!(confirmed, vec![
            Classification::NotInReference("A".into()),
            Classification::FoundInReference("B".into()),
            Classification::NotInReference("C".into()),
            Classification::AlreadyScanned("A".into()),
        ]);
        assert_eq!(engine.stats().confirmations, 4);
        assert_eq!(engine.stats().new_codes(), 3);
    }
}
