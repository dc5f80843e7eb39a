//! Headless driver: reads editor commands from stdin and runs them against an
//! in-memory device.

use clap::Parser;
use edublocks::app::{
    log_to_json, DispatchError, Dispatcher, Intent, Reply, UserPrompt, ViewMode, Workspace,
};
use edublocks::error::EditorError;
use edublocks_core::{DeviceEntry, DocumentKind, EditorConfig, MemoryDevice, TableCompiler};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SAMPLE_DIAGRAM: &str = r#"<xml xmlns="https://developers.google.com/blockly/xml"><block type="import_oled" x="20" y="20"><next><block type="oled_printLine"><field name="text">'Hello World!'</field><field name="line">0</field></block></next></block></xml>"#;

const HELP: &str = "\
commands:
  new                 start an empty blocks document
  open <path>         open a file from the device
  browse              show the file browser at the user directory
  ls                  list the current directory
  cd <dir>            enter a directory (.. goes up)
  pick <name>         select an entry of the current directory
  rename <name>       set the file name
  blocks <xml>        replace the diagram
  text <python>       replace the text
  save | run          save or run the document
  view blocks|python  switch the editing surface
  toggle              switch to the other surface
  close               close the terminal
  status              print the page state as JSON
  quit";

/// Headless block editor for MicroPython boards.
#[derive(Parser, Debug)]
#[command(name = "edublocks", version, about)]
struct Args {
    /// Directory where documents are created and saved.
    #[arg(long)]
    user_dir: Option<String>,
    /// Read-only directory holding sample documents.
    #[arg(long)]
    samples_dir: Option<String>,
    /// Save samples back to where they were opened from.
    #[arg(long)]
    no_relocate_samples: bool,
    /// Print the session log as JSON on exit.
    #[arg(long)]
    print_log: bool,
}

/// Prompt backed by the terminal.
struct StdioPrompt;

impl UserPrompt for StdioPrompt {
    fn report(&mut self, message: &str) {
        println!("! {message}");
    }

    fn prompt_filename(&mut self) -> Option<String> {
        print!("file name: ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

fn load_config(args: &Args) -> EditorConfig {
    let mut config = EditorConfig::from_env();
    if let Some(dir) = &args.user_dir {
        config.user_dir = dir.clone();
    }
    if let Some(dir) = &args.samples_dir {
        config.samples_dir = dir.clone();
    }
    if args.no_relocate_samples {
        config.relocate_samples = false;
    }
    config
}

fn seed_device(config: &EditorConfig) -> MemoryDevice {
    let samples = |name: &str| format!("{}/{name}", config.samples_dir.trim_end_matches('/'));
    MemoryDevice::new()
        .with_dir(&config.user_dir)
        .with_file(&format!("/{}", config.boot_file), "")
        .with_file(&samples("hello.xml"), SAMPLE_DIAGRAM)
        .with_file(&samples("blink.py"), "from machine import Pin\nPin(2, Pin.OUT).on()\n")
}

fn print_listing(entries: &[DeviceEntry]) {
    for entry in entries {
        let marker = if entry.isdir { "/" } else { "" };
        println!("  {}{marker}", entry.filename);
    }
}

fn parse_command(line: &str) -> Option<Intent> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let intent = match cmd {
        "new" => Intent::New,
        "open" => Intent::OpenPath(rest.to_string()),
        "browse" => Intent::OpenFileBrowser,
        "ls" => Intent::ChangeDirectory(".".to_string()),
        "cd" => Intent::ChangeDirectory(rest.to_string()),
        "rename" => Intent::Rename(rest.to_string()),
        "blocks" => Intent::DiagramEdited(rest.to_string()),
        "text" => Intent::TextChanged(rest.replace("\\n", "\n")),
        "save" => Intent::Save,
        "run" => Intent::Run,
        "view" => match rest {
            "blocks" => Intent::SetView(ViewMode::Diagram),
            "python" => Intent::SetView(ViewMode::Text),
            _ => return None,
        },
        "toggle" => Intent::ToggleView,
        "close" => Intent::CloseTerminal,
        "status" => Intent::Inspect,
        _ => return None,
    };
    Some(intent)
}

async fn pick(dispatcher: &Dispatcher, name: &str) -> Option<Intent> {
    let Ok(Reply::Listing(entries)) = dispatcher.send(Intent::ChangeDirectory(".".into())).await
    else {
        return None;
    };
    entries
        .into_iter()
        .find(|e| e.filename == name)
        .map(Intent::SelectEntry)
}

/// Plays the block canvas after a file was opened: a loaded diagram is
/// compiled right away so its text is ready to save and run.
async fn load_canvas(dispatcher: &Dispatcher) -> Result<(), DispatchError> {
    let Reply::State(state) = dispatcher.send(Intent::Inspect).await? else {
        return Ok(());
    };
    if state.kind != DocumentKind::Diagram || state.text.is_some() {
        return Ok(());
    }
    if let Some(source) = state.diagram_source {
        dispatcher.send(Intent::DiagramEdited(source)).await?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edublocks=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args);
    tracing::info!(user_dir = %config.user_dir, samples_dir = %config.samples_dir, "starting");

    let device = Arc::new(seed_device(&config));
    let workspace = Workspace::new(
        config,
        device.clone(),
        Box::new(TableCompiler::default()),
        Box::new(StdioPrompt),
    );
    workspace.attach_terminal(Box::new(|data| print!("{data}")));
    device.connect();
    let dispatcher = Dispatcher::spawn(workspace, 16);

    println!("{HELP}");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::error!(error = %err, "cannot read stdin");
                break;
            }
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" {
            break;
        }
        if input == "help" {
            println!("{HELP}");
            continue;
        }

        let intent = match input.split_once(' ') {
            Some(("pick", name)) => pick(&dispatcher, name.trim()).await,
            _ => parse_command(input),
        };
        let Some(intent) = intent else {
            println!("unknown command, type help");
            continue;
        };
        let opens_file = matches!(
            intent,
            Intent::OpenPath(_) | Intent::SelectEntry(DeviceEntry { isdir: false, .. })
        );

        match dispatcher.send(intent).await {
            Ok(Reply::Done) if opens_file => {
                if let Err(err) = load_canvas(&dispatcher).await {
                    tracing::warn!(error = %err, "cannot load the opened diagram");
                }
            }
            Ok(Reply::Done) => {}
            Ok(Reply::Edited(outcome)) => tracing::debug!(?outcome, "edited"),
            Ok(Reply::Listing(entries)) => print_listing(&entries),
            Ok(Reply::State(snapshot)) => match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::error!(error = %err, "cannot serialize state"),
            },
            // Refusals and device errors were already reported through the prompt.
            Err(DispatchError::Editor(EditorError::Refused(_)))
            | Err(DispatchError::Editor(EditorError::Transport(_))) => {}
            Err(err) => {
                tracing::error!(error = %err, "editor stopped");
                break;
            }
        }
    }

    match dispatcher.shutdown().await {
        Ok(workspace) => match log_to_json(workspace.log()) {
            Ok(json) if args.print_log => println!("{json}"),
            Ok(_) => {}
            Err(err) => tracing::error!(error = %err, "cannot serialize log"),
        },
        Err(err) => tracing::error!(error = %err, "editor worker failed"),
    }
}
