//! Bot initialization and webhook registration

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use weathercore::{config, Command};

/// Creates a Bot instance with custom or default API URL
///
/// `BOT_API_URL` points the bot at a local Bot API server or a test double.
pub fn create_bot(token: &SecretString) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let bot = match std::env::var("BOT_API_URL") {
        Ok(bot_api_url) if !bot_api_url.trim().is_empty() => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        _ => bot,
    };

    Ok(bot)
}

/// Menu entries, one per bot command, without the leading slash.
pub fn command_list() -> Vec<BotCommand> {
    Command::all().map(|c| BotCommand::new(c.name(), c.description())).collect()
}

/// Publishes the command menu shown by Telegram clients.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(command_list()).await?;
    Ok(())
}

/// Points Telegram at `url` and asks it to echo `secret` in every delivery.
pub async fn register_webhook(bot: &Bot, url: &str, secret: &SecretString) -> anyhow::Result<()> {
    let url = url::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid webhook URL {}: {}", url, e))?;

    bot.set_webhook(url.clone())
        .secret_token(secret.expose_secret().to_string())
        .await?;

    log::info!("Webhook set to {}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_menu() {
        let commands: Vec<BotCommand> = command_list();
        assert_eq!(commands.len(), 8);
        assert_eq!(commands[0].command, "start");
        assert_eq!(commands[2].command, "change_city");
        assert_eq!(commands[2].description, "change city");
    }

    #[test]
    fn test_create_bot_with_token() {
        let bot = create_bot(&SecretString::from("123:ABC")).unwrap();
        assert_eq!(bot.token(), "123:ABC");
    }
}
