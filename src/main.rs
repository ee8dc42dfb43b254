use std::path::PathBuf;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use taskbot::bot::{command_list, Action, AuthGate, Command, Handlers, Incoming, TelegramClient};
use taskbot::config::{load_env_file, Config};
use taskbot::digest;
use taskbot::notion::{NotionClient, TaskStore};
use taskbot::telegram_log::TelegramLogLayer;

#[tokio::main]
async fn main() {
    let env_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match load_env_file(env_path.as_deref()).and_then(|_| Config::from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("taskbot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        let tg_layer = TelegramLogLayer::new(bot.clone(), ChatId(log_chat_id));
        registry.with(tg_layer).init();
    } else {
        registry.init();
    }

    info!("🚀 Starting taskbot...");
    info!("Authorized IDs: {:?}", config.authorized_ids);
    for key in config.missing_settings() {
        warn!("{key} is not set");
    }

    let store: Arc<dyn TaskStore> = Arc::new(NotionClient::new(
        config.notion_secret.clone(),
        config.database_id.clone(),
    ));
    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    telegram.publish_commands(Command::bot_commands()).await.ok();

    match config.digest_chat_id {
        Some(chat_id) => {
            info!("Daily digest {} to chat {}", config.digest_schedule, chat_id);
            digest::spawn(config.digest_schedule.clone(), store.clone(), telegram.clone(), chat_id);
        }
        None => warn!("No DIGEST_CHAT_ID or AUTHORIZED_IDS, daily digest disabled"),
    }

    let handlers = Arc::new(Handlers::new(
        store,
        telegram,
        AuthGate::new(config.authorized_ids.iter().copied()),
        command_list(),
    ));

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
                .branch(dptree::endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handlers])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn incoming(msg: &Message, user_id: UserId) -> Incoming {
    Incoming {
        chat_id: msg.chat.id.0,
        user_id: user_id.0,
        message_id: Some(msg.id.0 as i64),
    }
}

async fn handle_command(msg: Message, cmd: Command, handlers: Arc<Handlers>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };

    let username = user.username.as_deref().unwrap_or(&user.first_name);
    info!("Command {:?} from {} ({})", cmd, username, user.id);

    let action = Action::from_command(cmd, &user.first_name);
    handlers.handle(&incoming(&msg, user.id), action).await;
    Ok(())
}

async fn handle_text(msg: Message, handlers: Arc<Handlers>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let text_preview: String = text.chars().take(100).collect();
    info!("Message from {} ({}): \"{}\"", user.first_name, user.id, text_preview);

    handlers.handle(&incoming(&msg, user.id), Action::Propose(text.to_string())).await;
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    handlers: Arc<Handlers>,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await.ok();

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let message = q.regular_message();
    let replied_text = message
        .and_then(|m| m.reply_to_message())
        .and_then(|m| m.text());

    let Some(action) = Action::from_callback(data, replied_text) else {
        warn!("Unknown callback data {:?} from {}", data, q.from.id);
        return Ok(());
    };
    info!("Callback {:?} from {} ({})", data, q.from.first_name, q.from.id);

    // Private chats share the user's id.
    let chat_id = message.map(|m| m.chat.id.0).unwrap_or(q.from.id.0 as i64);
    let from = Incoming { chat_id, user_id: q.from.id.0, message_id: None };
    handlers.handle(&from, action).await;
    Ok(())
}
