//! Instruction templates for every generative call in a turn.

pub fn classify(query: &str) -> String {
    format!(
        r#"Classify this query: "{query}"
Output ONLY one word:
- "LOG" if user says they ate something (e.g. "I ate an apple", "Add burger").
- "SHOP" if user wants to buy food (e.g. "Buy noodles", "Tesco nearby").
- "EAT" if user wants restaurant (e.g. "Suggest dinner", "Vegan restaurants").
- "ASK" if asking questions (e.g. "Apple calories", "Is Keto good?").
- "CHAT" for greetings."#
    )
}

pub fn extract_food(query: &str) -> String {
    format!("Extract the food name from: '{query}'. Output ONLY the name.")
}

pub fn extract_product(query: &str) -> String {
    format!("Extract the product to buy from: '{query}'. Output ONLY the product name.")
}

pub fn extract_cuisine(query: &str) -> String {
    format!("Extract the cuisine or restaurant type from: '{query}'. Output ONLY the type.")
}

pub fn summarize_sources(query: &str, context: &str) -> String {
    format!(
        r#"You are an expert Dietitian. Summarize the following information about "{query}".
Focus on:
1. Key Nutrients (Calories, Protein, Vitamins)
2. Health Benefits
3. Any dietary warnings

Keep it concise (bullet points).

Sources:
{context}"#
    )
}

pub fn persona_rewrite(query: &str, raw_answer: &str) -> String {
    format!(
        r#"You are EatWise, a sophisticated, highly knowledgeable clinical nutritionist.

User Query: "{query}"
Found Information: "{raw_answer}"

Task: Synthesize a helpful, warm response.
- Use short paragraphs and markdown.
- Be encouraging but scientific."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lists_every_label() {
        let prompt = classify("hi");
        for label in ["LOG", "SHOP", "EAT", "ASK"] {
            assert!(prompt.contains(label));
        }
        assert!(prompt.contains("\"hi\""));
    }
}
