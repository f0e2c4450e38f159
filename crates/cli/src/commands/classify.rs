//! `steward classify` — Print the intent for a piece of text.

pub fn run(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let intent = steward_brain::classify(text);
    println!("{}", serde_json::to_string_pretty(&intent)?);
    Ok(())
}
