use crate::services::search::{Place, SearchHit, ShoppingItem};

pub const MAX_LISTED: usize = 4;
pub const MAX_ORGANIC: usize = 3;

pub const NO_GROCERY_INFO: &str = "I couldn't find specific grocery stock info.";

pub fn log_confirmation(food: &str) -> String {
    format!("Tracking: I've logged **{}** to your daily intake.", food)
}

pub fn shopping(items: &[ShoppingItem]) -> String {
    let mut out = String::from("**Grocery Suggestions:**\n");
    for item in items.iter().take(MAX_LISTED) {
        out.push_str(&format!(
            "- {} ({}) @ {}\n",
            item.title.as_deref().unwrap_or("Unknown"),
            item.price.as_deref().unwrap_or("N/A"),
            item.source.as_deref().unwrap_or("Unknown Store"),
        ));
    }
    out
}

pub fn organic(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_GROCERY_INFO.to_string();
    }
    let mut out = String::from("**Grocery Search Results:**\n");
    for hit in hits.iter().take(MAX_ORGANIC) {
        out.push_str(&format!("- **{}**: {}\n", hit.title, hit.snippet));
    }
    out
}

pub fn places(cuisine: &str, location: &str, places: &[Place]) -> String {
    if places.is_empty() {
        return format!("I couldn't find any restaurants matching '{}' in {}.", cuisine, location);
    }
    let mut out = format!("**Restaurant Recommendations for {} ({}):**\n", cuisine, location);
    for place in places.iter().take(MAX_LISTED) {
        let rating = place.rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!(
            "- **{}** (⭐{}): {}\n",
            place.title.as_deref().unwrap_or("Unknown"),
            rating,
            place.address.as_deref().unwrap_or("No address"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(title: &str, rating: f32) -> Place {
        Place { title: Some(title.to_string()), rating: Some(rating), address: None }
    }

    #[test]
    fn places_are_capped_and_defaulted() {
        let found: Vec<Place> = (0..6).map(|i| place(&format!("Spot {}", i), 4.5)).collect();
        let text = places("vegan", "London", &found);
        assert!(text.starts_with("**Restaurant Recommendations for vegan (London):**\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("- ")).count(), MAX_LISTED);
        assert!(text.contains("- **Spot 0** (⭐4.5): No address"));
    }

    #[test]
    fn empty_places_is_not_found_sentence() {
        assert_eq!(
            places("sushi", "Leeds", &[]),
            "I couldn't find any restaurants matching 'sushi' in Leeds."
        );
    }

    #[test]
    fn shopping_lines_fill_missing_fields() {
        let items = vec![
            ShoppingItem { title: Some("Oat milk".into()), price: Some("£1.50".into()), source: Some("Tesco".into()) },
            ShoppingItem::default(),
        ];
        let text = shopping(&items);
        assert!(text.contains("- Oat milk (£1.50) @ Tesco\n"));
        assert!(text.contains("- Unknown (N/A) @ Unknown Store\n"));
    }

    #[test]
    fn organic_takes_three() {
        let hits: Vec<SearchHit> = (0..5)
            .map(|i| SearchHit { title: format!("t{}", i), snippet: "s".into(), link: None })
            .collect();
        let text = organic(&hits);
        assert!(text.starts_with("**Grocery Search Results:**\n"));
        assert!(text.contains("- **t2**: s"));
        assert!(!text.contains("t3"));
        assert_eq!(organic(&[]), NO_GROCERY_INFO);
    }
}
