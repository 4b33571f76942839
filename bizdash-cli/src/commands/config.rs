use anyhow::Result;
use bizdash_core::BizdashConfig;
use owo_colors::OwoColorize;

pub fn run(set_api_url: Option<String>, set_token: Option<String>) -> Result<()> {
    let config_path = BizdashConfig::config_path()?;

    if set_api_url.is_some() || set_token.is_some() {
        // Only file values are written back, never environment overrides
        let mut stored = BizdashConfig::load_file()?;
        if let Some(url) = set_api_url {
            stored.api_url = url;
        }
        if let Some(token) = set_token {
            stored.token = Some(token);
        }
        stored.save()?;
        println!("{} {}", "Saved".green(), config_path.display());
    }

    let config = BizdashConfig::load()?;

    let token = match &config.token {
        Some(_) => "set".green().to_string(),
        None => "not set".red().to_string(),
    };

    println!("{}", "Settings".bold());
    println!("  Config:     {}", config_path.display());
    println!("  API URL:    {}", config.api_url);
    println!("  Token:      {}", token);
    println!("  Log level:  {}", config.log_level);
    println!("  Timeout:    {}s", config.request_timeout_secs);

    Ok(())
}
