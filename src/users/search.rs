use super::dto::SearchParams;

/// A `search` query term: `@name` means exact username lookup, anything else
/// is a substring match over names and skill lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    Username(String),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    CreatedAt,
    Nearest,
}

/// Parsed directory filter, independent of the SQL that executes it.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub term: Option<SearchTerm>,
    pub skill: Option<String>,
    pub day: Option<String>,
    pub time_slot: Option<String>,
    pub sort: SortOrder,
}

impl SearchFilter {
    pub fn from_params(params: &SearchParams) -> Self {
        let term = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('@') {
                Some(username) => SearchTerm::Username(username.to_lowercase()),
                None => SearchTerm::Text(s.to_string()),
            });

        let skill = params
            .skill
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let (day, time_slot) = params
            .availability
            .as_deref()
            .map(parse_availability)
            .unwrap_or((None, None));

        let sort = match params.sort.as_deref() {
            Some("nearest") => SortOrder::Nearest,
            _ => SortOrder::CreatedAt,
        };

        Self {
            term,
            skill,
            day,
            time_slot,
            sort,
        }
    }
}

/// `day-timeslot` compound filter; either side may be empty for "any".
/// A value with no dash is a day filter alone.
fn parse_availability(raw: &str) -> (Option<String>, Option<String>) {
    let (day, slot) = match raw.split_once('-') {
        Some((day, slot)) => (day, slot),
        None => (raw, ""),
    };
    let clean = |s: &str| {
        let s = s.trim().to_lowercase();
        (!s.is_empty()).then_some(s)
    };
    (clean(day), clean(slot))
}

/// Escapes `%`, `_` and `\` so user input can be embedded in a LIKE pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(search: Option<&str>, availability: Option<&str>, sort: Option<&str>) -> SearchParams {
        SearchParams {
            search: search.map(str::to_string),
            skill: None,
            availability: availability.map(str::to_string),
            sort: sort.map(str::to_string),
            page: None,
            limit: None,
        }
    }

    #[test]
    fn at_prefix_is_exact_username_lowercased() {
        let filter = SearchFilter::from_params(&params(Some("@Alice"), None, None));
        assert_eq!(filter.term, Some(SearchTerm::Username("alice".into())));
    }

    #[test]
    fn plain_search_is_text_term() {
        let filter = SearchFilter::from_params(&params(Some(" guitar "), None, None));
        assert_eq!(filter.term, Some(SearchTerm::Text("guitar".into())));
    }

    #[test]
    fn blank_search_is_no_term() {
        let filter = SearchFilter::from_params(&params(Some("   "), None, None));
        assert_eq!(filter.term, None);
    }

    #[test]
    fn availability_splits_day_and_slot() {
        assert_eq!(
            parse_availability("Monday-Evening"),
            (Some("monday".into()), Some("evening".into()))
        );
        assert_eq!(parse_availability("monday-"), (Some("monday".into()), None));
        assert_eq!(parse_availability("-evening"), (None, Some("evening".into())));
        assert_eq!(parse_availability("monday"), (Some("monday".into()), None));
    }

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        let filter = SearchFilter::from_params(&params(None, None, Some("username")));
        assert_eq!(filter.sort, SortOrder::CreatedAt);
        let filter = SearchFilter::from_params(&params(None, None, Some("nearest")));
        assert_eq!(filter.sort, SortOrder::Nearest);
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("guitar"), "guitar");
    }
}
