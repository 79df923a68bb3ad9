//! Terminal driver — wiring plus a minimal stdin/stdout REPL.
//!
//! The REPL is a stand-in presentation layer: it issues intents to the store
//! and resolvers and renders their state, nothing more.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

use assistant_desk::api::{AssistantsApi, OpenAiClient};
use assistant_desk::assistant::{Assistant, AssistantDraft, MODELS, ResponseFormat};
use assistant_desk::config::AppConfig;
use assistant_desk::credential::CredentialHolder;
use assistant_desk::storage::{SettingsStore, keys};
use assistant_desk::store::AssistantStore;
use assistant_desk::theme::{ColorScheme, ThemePreference, ThemeResolver, spawn_os_signal_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::default();
    let storage = Arc::new(SettingsStore::open(&config.settings_dir).await?);
    let holder = CredentialHolder::load(Arc::clone(&storage)).await;

    eprintln!("🗂  Assistant Desk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Settings: {}", config.settings_dir.display());
    eprintln!("   Type 'help' for commands. 'quit' to exit.\n");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    // Nothing is reachable until a credential is set.
    let api_key = match holder.get().await {
        Some(key) => key,
        None => prompt_for_key(&holder, &mut lines).await?,
    };

    // OS color-scheme signal. A terminal has no media query; the initial
    // value comes from the environment and the channel stays open so a real
    // signal source could drive it.
    let prefers_dark = std::env::var("ASSISTANT_DESK_PREFERS_DARK")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let (_os_tx, os_rx) = watch::channel(if prefers_dark {
        ColorScheme::Dark
    } else {
        ColorScheme::Light
    });
    let resolver = ThemeResolver::load(Arc::clone(&storage), os_rx).await;
    let _follower = spawn_os_signal_task(Arc::clone(&resolver));

    let api: Arc<dyn AssistantsApi> =
        Arc::new(OpenAiClient::new(config.api_base_url.clone(), api_key));
    let mut store = AssistantStore::new(api, config.list_limit);
    let mut busy_printer = spawn_busy_printer(&store);

    if let Err(e) = store.fetch_all().await {
        eprintln!("❌ {e}");
    }
    print_assistants(&store).await;

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_help(),
            "list" => {
                if let Err(e) = store.fetch_all().await {
                    eprintln!("❌ {e}");
                }
                print_assistants(&store).await;
            }
            "show" => print_assistants(&store).await,
            "select" => {
                store.select(rest).await;
                print_selected(&store).await;
            }
            "create" => {
                let draft = AssistantDraft {
                    name: rest.to_string(),
                    ..Default::default()
                };
                match store.create(draft).await {
                    Ok(created) => eprintln!("✅ Created {} ({})", created.name, created.id),
                    Err(e) => eprintln!("❌ {e}"),
                }
            }
            "delete" => {
                if !storage.get_bool(keys::SHOW_DELETE_BUTTON).await.unwrap_or(false) {
                    eprintln!("ℹ️  Deletion is disabled; enable it with 'show-delete on'");
                } else if let Err(e) = store.delete(rest).await {
                    eprintln!("❌ {e}");
                } else {
                    eprintln!("✅ Deleted {rest}");
                }
            }
            "show-delete" => match rest {
                "on" => {
                    storage.set_bool(keys::SHOW_DELETE_BUTTON, true).await?;
                    eprintln!("✅ Delete command enabled");
                }
                "off" => {
                    storage.set_bool(keys::SHOW_DELETE_BUTTON, false).await?;
                    eprintln!("✅ Delete command disabled");
                }
                _ => eprintln!("Usage: show-delete <on|off>"),
            },
            "name" => edit_selected(&store, |a| a.name = rest.to_string()).await,
            "instructions" => {
                edit_selected(&store, |a| a.instructions = rest.to_string()).await
            }
            "model" => {
                if !MODELS.contains(&rest) {
                    eprintln!("ℹ️  Unknown model '{rest}' (advisory list), sending anyway");
                }
                edit_selected(&store, |a| a.model = rest.to_string()).await;
            }
            "format" => match rest.parse() {
                Ok(kind) => {
                    edit_selected(&store, |a| a.response_format = ResponseFormat { kind }).await
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            "temp" => match rest.parse::<f64>() {
                Ok(value) => store.set_pending_temperature(value).await,
                Err(_) => eprintln!("Usage: temp <number>"),
            },
            "commit-temp" => {
                if let Some(id) = store.selected_id().await {
                    if let Err(e) = store.commit_temperature(&id).await {
                        eprintln!("❌ {e}");
                    }
                }
            }
            "topp" => match rest.parse::<f64>() {
                Ok(value) => store.set_pending_top_p(value).await,
                Err(_) => eprintln!("Usage: topp <number>"),
            },
            "commit-topp" => {
                if let Some(id) = store.selected_id().await {
                    if let Err(e) = store.commit_top_p(&id).await {
                        eprintln!("❌ {e}");
                    }
                }
            }
            "theme" => match rest.parse::<ThemePreference>() {
                Ok(preference) => {
                    resolver.set_preference(preference).await;
                    eprintln!("✅ Theme: {preference} (effective {:?})", resolver.effective());
                }
                Err(_) => eprintln!("Usage: theme <light|dark|system>"),
            },
            "key" => match holder.set(rest).await {
                Ok(new_key) => {
                    busy_printer.abort();
                    let api: Arc<dyn AssistantsApi> =
                        Arc::new(OpenAiClient::new(config.api_base_url.clone(), new_key));
                    store = AssistantStore::new(api, config.list_limit);
                    busy_printer = spawn_busy_printer(&store);
                    if let Err(e) = store.fetch_all().await {
                        eprintln!("❌ {e}");
                    }
                    print_assistants(&store).await;
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            other => eprintln!("Unknown command '{other}', try 'help'"),
        }
        eprint!("> ");
    }

    Ok(())
}

/// Block until the user supplies a non-blank API key.
async fn prompt_for_key(
    holder: &CredentialHolder,
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<SecretString> {
    eprintln!("No API key configured.");
    loop {
        eprint!("API key: ");
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("stdin closed before an API key was entered");
        };
        match holder.set(line.trim()).await {
            Ok(key) => return Ok(key),
            Err(e) => eprintln!("❌ {e}"),
        }
    }
}

/// Print busy status transitions while remote calls are in flight.
fn spawn_busy_printer(store: &AssistantStore) -> tokio::task::JoinHandle<()> {
    let mut rx = store.subscribe_busy();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow().clone();
            if state.busy {
                eprintln!("⏳ {}", state.message);
            }
        }
    })
}

async fn print_assistants(store: &AssistantStore) {
    let assistants = store.assistants().await;
    let selected = store.selected_id().await;
    if assistants.is_empty() {
        eprintln!("(no assistants)");
        return;
    }
    for assistant in &assistants {
        let marker = if selected.as_deref() == Some(assistant.id.as_str()) {
            "*"
        } else {
            " "
        };
        eprintln!(
            "{marker} {}  {}  [{}]",
            assistant.id, assistant.name, assistant.model
        );
    }
}

async fn print_selected(store: &AssistantStore) {
    match store.selected().await {
        Some(a) => {
            eprintln!("{} ({})", a.name, a.id);
            eprintln!("  model:        {}", a.model);
            eprintln!("  format:       {:?}", a.response_format.kind);
            eprintln!("  temperature:  {:?}", a.temperature);
            eprintln!("  top_p:        {:?}", a.top_p);
            if !a.instructions.is_empty() {
                eprintln!("  instructions: {}", a.instructions);
            }
        }
        // Dangling or empty selection renders as nothing selected.
        None => eprintln!("(nothing selected)"),
    }
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  list                     refetch and print all assistants");
    eprintln!("  show                     print the cached collection");
    eprintln!("  select <id>              select an assistant");
    eprintln!("  create <name>            create a new assistant");
    eprintln!("  delete <id>              delete (requires 'show-delete on')");
    eprintln!("  show-delete <on|off>     toggle the delete command");
    eprintln!("  name <text>              rename the selected assistant");
    eprintln!("  instructions <text>      set system instructions");
    eprintln!("  model <id>               set the model");
    eprintln!("  format <text|json_object|json_schema>");
    eprintln!("  temp <n> / commit-temp   stage and commit temperature");
    eprintln!("  topp <n> / commit-topp   stage and commit top_p");
    eprintln!("  theme <light|dark|system>");
    eprintln!("  key <api-key>            replace the API key and refetch");
    eprintln!("  quit");
}

/// Apply an edit to the selected assistant and push the update.
async fn edit_selected(store: &AssistantStore, edit: impl FnOnce(&mut Assistant)) {
    let Some(mut assistant) = store.selected().await else {
        eprintln!("(nothing selected)");
        return;
    };
    edit(&mut assistant);
    if let Err(e) = store.update(&assistant).await {
        eprintln!("❌ {e}");
    }
}
