use artifact_curator::{Config, GeminiClient, ModelInfo};
use std::io::Write;

fn write_model(out: &mut impl Write, model: &ModelInfo) -> std::io::Result<()> {
    writeln!(out, "- {}", model.name)?;
    writeln!(out, "  Display name: {}", model.display_name)?;
    let methods: Vec<String> = model
        .supported_generation_methods
        .iter()
        .map(|m| format!("'{m}'"))
        .collect();
    writeln!(out, "  Supported methods: [{}]", methods.join(", "))?;
    writeln!(out)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let client = GeminiClient::new(config);
    let models = client.list_models().await?;
    log::debug!("{} models visible to this key", models.len());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Available models:")?;
    for model in models.iter().filter(|m| m.supports_generate_content()) {
        write_model(&mut out, model)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_block_format() {
        let model = ModelInfo {
            name: "models/gemini-2.5-flash".into(),
            display_name: "Gemini 2.5 Flash".into(),
            supported_generation_methods: vec!["generateContent".into(), "countTokens".into()],
        };
        let mut out = Vec::new();
        write_model(&mut out, &model).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "- models/gemini-2.5-flash\n  Display name: Gemini 2.5 Flash\n  Supported methods: ['generateContent', 'countTokens']\n\n"
        );
    }

    #[test]
    fn test_model_without_methods() {
        let model = ModelInfo {
            name: "models/aqa".into(),
            display_name: String::new(),
            supported_generation_methods: Vec::new(),
        };
        let mut out = Vec::new();
        write_model(&mut out, &model).unwrap();

        assert!(String::from_utf8(out).unwrap().contains("  Supported methods: []\n"));
    }
}
