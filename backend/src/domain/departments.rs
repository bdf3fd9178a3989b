//! Which departments a beneficiary sees offers from.

/// Departments with an extended visibility area.
const VISIBILITY: &[(&str, &[&str])] = &[
    ("08", &["02", "08", "51", "55", "59"]),
    ("25", &["21", "25", "39", "67", "68", "70", "71", "90"]),
    ("29", &["22", "35", "29", "56"]),
    ("34", &["11", "12", "13", "30", "31", "34", "48", "66", "81", "84"]),
    ("35", &["22", "29", "35", "44", "49", "50", "53", "56"]),
    ("58", &["03", "18", "21", "45", "58", "71", "89"]),
    ("67", &["54", "55", "57", "67", "68", "88"]),
    ("71", &["01", "03", "21", "39", "42", "58", "69", "71"]),
    ("84", &["04", "07", "13", "26", "30", "83", "84"]),
    ("93", &["75", "77", "78", "91", "92", "93", "94", "95"]),
    ("94", &["75", "77", "78", "91", "92", "93", "94", "95"]),
    ("97", &["97", "971", "972", "973"]),
];

/// Department codes visible from `departement_code`.
///
/// The lookup uses the first two characters; departments outside the table
/// only see themselves.
///
/// # Examples
/// ```
/// use backend::domain::visible_departement_codes;
///
/// assert!(visible_departement_codes("93").contains(&"75".to_owned()));
/// assert_eq!(visible_departement_codes("13"), vec!["13".to_owned()]);
/// ```
pub fn visible_departement_codes(departement_code: &str) -> Vec<String> {
    let prefix: String = departement_code.chars().take(2).collect();
    VISIBILITY
        .iter()
        .find(|(code, _)| *code == prefix)
        .map_or_else(
            || vec![departement_code.to_owned()],
            |(_, visible)| visible.iter().map(|code| (*code).to_owned()).collect(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("08", 5)]
    #[case("34", 10)]
    #[case("973", 4)]
    fn table_departments(#[case] code: &str, #[case] expected_len: usize) {
        assert_eq!(visible_departement_codes(code).len(), expected_len);
    }

    #[rstest]
    fn overseas_lookup_uses_prefix() {
        let visible = visible_departement_codes("971");
        assert!(visible.contains(&"972".to_owned()));
    }

    #[rstest]
    fn unknown_department_sees_itself() {
        assert_eq!(visible_departement_codes("2A"), vec!["2A".to_owned()]);
    }
}
