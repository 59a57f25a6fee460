/// General nutrition facts written into a fresh knowledge cache.
pub const BOOTSTRAP_FACTS: &[&str] = &[
    // Macronutrients
    "Proteins are essential macronutrients that help build and repair muscles. Good sources include chicken, fish, eggs, beans, and tofu. Adults need about 0.8g of protein per kg of body weight daily.",
    "Carbohydrates are the body's main energy source. Complex carbs (whole grains, vegetables) are healthier than simple carbs (sugar, white bread). About 45-65% of daily calories should come from carbs.",
    "Healthy fats are essential for brain function and hormone production. Sources include avocados, nuts, olive oil, and fatty fish. Limit saturated and trans fats.",
    "Fiber aids digestion and helps maintain healthy blood sugar levels. Good sources include whole grains, fruits, vegetables, and legumes. Adults need 25-38g daily.",
    // Vitamins
    "Vitamin C boosts immune function and helps absorb iron. Found in citrus fruits, strawberries, bell peppers, and broccoli. Daily need: 65-90mg.",
    "Vitamin D is essential for bone health and immune function. Sources include sunlight, fatty fish, and fortified foods. Many people are deficient.",
    "Vitamin B12 is crucial for nerve function and red blood cell formation. Found mainly in animal products. Vegans should supplement.",
    "Vitamin A supports vision and immune health. Found in carrots, sweet potatoes, spinach, and liver.",
    // Minerals
    "Calcium is essential for strong bones and teeth. Found in dairy, leafy greens, and fortified foods. Adults need 1000-1200mg daily.",
    "Iron carries oxygen in the blood. Found in red meat, beans, spinach, and fortified cereals. Women need more iron than men.",
    "Potassium helps regulate blood pressure and muscle function. Found in bananas, potatoes, and leafy greens.",
    "Magnesium supports muscle and nerve function. Found in nuts, seeds, whole grains, and dark chocolate.",
    // Guidelines
    "A balanced diet includes fruits, vegetables, whole grains, lean proteins, and healthy fats. Limit processed foods, added sugars, and sodium.",
    "Hydration is essential. Adults should drink about 8 glasses (2 liters) of water daily, more during exercise or hot weather.",
    "Eating a variety of colorful vegetables ensures you get different nutrients. Each color represents different beneficial compounds.",
    "Portion control is key for weight management. Use smaller plates and be mindful of serving sizes.",
];
