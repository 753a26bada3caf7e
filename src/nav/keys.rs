//! Keys identifying in-flight loads, shown in the debug pane and used to track spinners.
//!
//! Listing and detail keys carry the request generation, so a refresh or a
//! re-selection in flight next to an older request gets its own key.

pub fn listing_key(collection: &str, generation: u64) -> String {
    format!("listing:{collection}#{generation}")
}

pub fn detail_key(collection: &str, id: &str, generation: u64) -> String {
    format!("detail:{collection}/{id}#{generation}")
}

pub fn remove_key(collection: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("remove:{collection}/{id}"),
        None => format!("remove:{collection}/*"),
    }
}

pub const LOGIN_KEY: &str = "account:login";
pub const UPDATE_USER_KEY: &str = "account:update";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_collection() {
        assert_eq!(listing_key("statistics", 3), "listing:statistics#3");
        assert_eq!(detail_key("experiments", "4", 1), "detail:experiments/4#1");
        assert_ne!(listing_key("statistics", 1), listing_key("statistics", 2));
        assert_ne!(detail_key("a", "1", 1), detail_key("a", "1", 2));
        assert_eq!(remove_key("experiments", None), "remove:experiments/*");
        assert_ne!(detail_key("a", "1", 1), detail_key("b", "1", 1));
    }
}
