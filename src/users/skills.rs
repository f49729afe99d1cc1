/// Fixed vocabularies for availability. Anything outside these is rejected
/// at validation time.
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub const TIME_SLOTS: [&str; 4] = ["morning", "afternoon", "evening", "night"];

/// Trims, lowercases, drops empties and deduplicates while keeping the
/// first-seen order. Applied to every skill list before persistence.
pub fn normalize_skills(raw: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for skill in raw {
        let skill = skill.trim().to_lowercase();
        if skill.is_empty() || seen.contains(&skill) {
            continue;
        }
        seen.push(skill);
    }
    seen
}

/// Case-insensitive membership test against an already-normalized list.
pub fn contains_skill(skills: &[String], skill: &str) -> bool {
    let skill = skill.trim().to_lowercase();
    skills.iter().any(|s| *s == skill)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_trims_lowercases_and_dedups() {
        let input = owned(&["  Python ", "python", "GUITAR", "", "  ", "guitar"]);
        assert_eq!(normalize_skills(&input), owned(&["python", "guitar"]));
    }

    #[test]
    fn normalize_keeps_first_seen_order() {
        let input = owned(&["Zig", "ada", "zig"]);
        assert_eq!(normalize_skills(&input), owned(&["zig", "ada"]));
    }

    #[test]
    fn normalize_of_empty_is_empty() {
        assert!(normalize_skills(&[]).is_empty());
    }

    #[test]
    fn contains_skill_is_case_insensitive() {
        let skills = owned(&["python", "guitar"]);
        assert!(contains_skill(&skills, "Python"));
        assert!(contains_skill(&skills, "  GUITAR "));
        assert!(!contains_skill(&skills, "piano"));
    }
}
