use edublocks::app::{ConnectionStatus, LogLevel, LogMessage, ScriptedPrompt, ViewMode, Workspace};
use edublocks::{EditorError, Refusal};
use edublocks_core::transport::{Execution, Operation};
use edublocks_core::{DeviceEntry, DocumentKind, EditorConfig, MemoryDevice, RawFile, TableCompiler};
use std::sync::{Arc, Mutex};

const HELLO: &str = r#"<xml><block type="import_oled"><next><block type="oled_printLine"><field name="text">'Hi'</field><field name="line">2</field></block></next></block></xml>"#;

fn device() -> Arc<MemoryDevice> {
    Arc::new(
        MemoryDevice::new()
            .with_file("/boot.py", "")
            .with_file("/user/boot.py", "")
            .with_file("/user/main.py", "print('main')\n")
            .with_file("/user/notes.txt", "todo")
            .with_dir("/user/lib")
            .with_file("/user/lib/helper.py", "def f():\n    pass\n")
            .with_file("/samples/hello.xml", HELLO),
    )
}

fn workspace(device: &Arc<MemoryDevice>, prompt: &ScriptedPrompt) -> Workspace {
    Workspace::new(
        EditorConfig::default(),
        device.clone(),
        Box::new(TableCompiler::default()),
        Box::new(prompt.clone()),
    )
}

#[tokio::test]
async fn diagram_is_compiled_saved_and_run() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    prompt.answer(Some("greeting"));
    let mut ws = workspace(&device, &prompt);

    ws.apply_diagram(HELLO).unwrap();
    assert_eq!(ws.document().text(), Some("import oled\noled.printLine('Hi', 2)\n"));
    assert!(ws.sync_indicator());

    ws.run().await.unwrap();

    assert_eq!(ws.document_path().as_deref(), Some("/user/greeting.xml"));
    assert_eq!(
        device.file_text("/user/greeting.xml").as_deref(),
        Some("import oled\noled.printLine('Hi', 2)\n")
    );
    assert_eq!(device.operations(), vec![Operation::Write, Operation::RunCode]);
    assert_eq!(
        device.executions(),
        vec![Execution::Code("import oled\noled.printLine('Hi', 2)\n".into())]
    );
    assert!(ws.terminal_open());
    assert!(prompt.reports().is_empty());
}

#[tokio::test]
async fn renaming_to_python_converts_the_document() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.apply_diagram(HELLO).unwrap();
    ws.rename("greeting.py").unwrap();

    assert_eq!(ws.document().kind(), DocumentKind::Script);
    assert_eq!(ws.document().text(), Some("import oled\noled.printLine('Hi', 2)\n"));
    assert_eq!(ws.view_mode(), ViewMode::Text);

    let before = ws.document().clone();
    let err = ws.rename("greeting.xml").unwrap_err();
    assert_eq!(err, EditorError::Refused(Refusal::ScriptToDiagram));
    assert_eq!(ws.document(), &before);

    let err = ws.set_view(ViewMode::Diagram).unwrap_err();
    assert_eq!(err, EditorError::Refused(Refusal::DiagramViewUnavailable));
    assert_eq!(ws.view_mode(), ViewMode::Text);
    assert_eq!(prompt.reports().len(), 2);
}

#[tokio::test]
async fn dirty_text_is_saved_but_stays_dirty() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.apply_diagram(HELLO).unwrap();
    ws.rename("hello").unwrap();
    ws.edit_from_text("print('edited')\n").unwrap();
    assert!(!ws.sync_indicator());

    ws.save().await.unwrap();
    assert_eq!(device.file_text("/user/hello.xml").as_deref(), Some("print('edited')\n"));
    assert!(!ws.sync_indicator());
}

#[tokio::test]
async fn failed_save_is_reported_and_changes_nothing() {
    let device = device();
    device.fail(Operation::Write);
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.open_path("/user/main.py").await.unwrap();
    ws.edit_from_text("print('changed')\n").unwrap();
    let before = ws.document().clone();

    let err = ws.run().await.unwrap_err();
    assert!(matches!(err, EditorError::Transport(_)));
    assert_eq!(ws.document(), &before);
    assert!(device.executions().is_empty());
    assert!(!ws.terminal_open());
    assert_eq!(device.file_text("/user/main.py").as_deref(), Some("print('main')\n"));
    assert_eq!(ws.log_entries(LogLevel::Error).count(), 1);

    device.recover(Operation::Write);
    ws.run().await.unwrap();
    assert_eq!(
        device.executions(),
        vec![Execution::Line("exec(open('/user/main.py').read())".into())]
    );
}

#[tokio::test]
async fn samples_open_into_the_user_dir() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.open_path("/samples/hello.xml").await.unwrap();
    assert_eq!(ws.document().kind(), DocumentKind::Diagram);
    assert_eq!(ws.document().diagram_source(), Some(HELLO));
    assert_eq!(ws.document().text(), None);
    assert_eq!(ws.document_path().as_deref(), Some("/user/hello.xml"));
}

#[tokio::test]
async fn samples_stay_put_when_relocation_is_off() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let config = EditorConfig {
        relocate_samples: false,
        ..EditorConfig::default()
    };
    let mut ws = Workspace::new(
        config,
        device.clone(),
        Box::new(TableCompiler::default()),
        Box::new(prompt.clone()),
    );

    ws.open_path("/samples/hello.xml").await.unwrap();
    assert_eq!(ws.document_path().as_deref(), Some("/samples/hello.xml"));
}

#[tokio::test]
async fn opened_diagram_cannot_be_saved_before_compiling() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.open_path("/samples/hello.xml").await.unwrap();

    let err = ws.save().await.unwrap_err();
    assert_eq!(err, EditorError::Refused(Refusal::NothingToSave));
    assert!(!device.operations().contains(&Operation::Write));
}

#[tokio::test]
async fn file_browser_walks_directories_and_opens_files() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.open_file_browser().await.unwrap();
    assert!(ws.file_browser_open());
    let names: Vec<_> = ws.visible_entries().iter().map(|e| e.filename.clone()).collect();
    assert_eq!(names, vec!["lib", "main.py"]);

    ws.select_entry(&DeviceEntry::dir("lib")).await.unwrap();
    assert_eq!(ws.directory().cwd(), "/user/lib");

    ws.change_directory("..").await.unwrap();
    ws.change_directory("..").await.unwrap();
    ws.change_directory("..").await.unwrap();
    assert_eq!(ws.directory().cwd(), "/");

    ws.change_directory("user").await.unwrap();
    ws.select_entry(&DeviceEntry::file("main.py")).await.unwrap();
    assert!(!ws.file_browser_open());
    assert_eq!(ws.document_path().as_deref(), Some("/user/main.py"));
    assert_eq!(ws.view_mode(), ViewMode::Text);
}

#[tokio::test]
async fn missing_directory_keeps_the_browser_where_it_was() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.open_file_browser().await.unwrap();

    let err = ws.change_directory("nowhere").await.unwrap_err();
    assert!(matches!(err, EditorError::Transport(_)));
    assert_eq!(ws.directory().cwd(), "/user");
    assert_eq!(prompt.reports().len(), 1);
}

#[tokio::test]
async fn raw_files_are_uploaded_to_the_root() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.upload(RawFile {
        name: "font.bin".into(),
        bytes: vec![0, 159, 146, 150],
    })
    .await
    .unwrap();
    assert_eq!(device.file_bytes("/font.bin"), Some(vec![0, 159, 146, 150]));
}

#[tokio::test]
async fn connection_status_follows_the_device() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let ws = workspace(&device, &prompt);
    let mut status = ws.subscribe_status();
    assert_eq!(ws.connection_status(), ConnectionStatus::Disconnected);

    device.connect();
    status.changed().await.unwrap();
    assert_eq!(*status.borrow(), ConnectionStatus::Connected);
    assert_eq!(ws.connection_status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn terminal_receives_device_output() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let ws = workspace(&device, &prompt);
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&seen);
    ws.attach_terminal(Box::new(move |data| sink.lock().unwrap().push_str(data)));

    device.push_data(">>> ");
    device.push_data("hi\n");
    assert_eq!(seen.lock().unwrap().as_str(), ">>> hi\n");
}

#[tokio::test]
async fn toggle_view_follows_the_document_kind() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.toggle_view().unwrap();
    assert_eq!(ws.view_mode(), ViewMode::Text);
    ws.toggle_view().unwrap();
    assert_eq!(ws.view_mode(), ViewMode::Diagram);

    ws.open_path("/user/main.py").await.unwrap();
    assert_eq!(ws.view_mode(), ViewMode::Text);
    let err = ws.toggle_view().unwrap_err();
    assert_eq!(err, EditorError::Refused(Refusal::DiagramViewUnavailable));
    assert_eq!(ws.view_mode(), ViewMode::Text);
    assert_eq!(prompt.reports(), vec!["Block view not available"]);
}

#[tokio::test]
async fn new_document_returns_to_the_block_view() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.open_path("/user/main.py").await.unwrap();
    assert_eq!(ws.view_mode(), ViewMode::Text);

    ws.new_document();

    assert_eq!(ws.view_mode(), ViewMode::Diagram);
    assert_eq!(ws.document().kind(), DocumentKind::Diagram);
    assert_eq!(ws.document().file_name(), None);
    assert_eq!(ws.document().text(), None);
    assert_eq!(ws.document_path(), None);
    assert!(ws.sync_indicator());
}

#[tokio::test]
async fn rejected_run_code_keeps_the_terminal_closed() {
    let device = device();
    device.fail(Operation::RunCode);
    let prompt = ScriptedPrompt::new();
    prompt.answer(Some("demo"));
    let mut ws = workspace(&device, &prompt);
    ws.apply_diagram(HELLO).unwrap();

    let err = ws.run().await.unwrap_err();

    assert!(matches!(err, EditorError::Transport(_)));
    assert!(device.file_text("/user/demo.xml").is_some());
    assert!(device.executions().is_empty());
    assert!(!ws.terminal_open());
    let errors: Vec<_> = ws.log_entries(LogLevel::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message_key, LogMessage::RunError);
}

#[tokio::test]
async fn rejected_run_line_keeps_the_terminal_closed() {
    let device = device();
    device.fail(Operation::RunLine);
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.open_path("/user/main.py").await.unwrap();
    let before = ws.document().clone();

    let err = ws.run().await.unwrap_err();

    assert!(matches!(err, EditorError::Transport(_)));
    assert_eq!(ws.document(), &before);
    assert!(!ws.terminal_open());
    assert_eq!(ws.log_entries(LogLevel::Error).count(), 1);
    assert_eq!(prompt.reports().len(), 1);
}

#[tokio::test]
async fn failed_upload_is_reported() {
    let device = device();
    device.fail(Operation::SendRaw);
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    let before = ws.document().clone();

    let err = ws
        .upload(RawFile {
            name: "font.bin".into(),
            bytes: vec![1],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EditorError::Transport(_)));
    assert!(device.file_bytes("/font.bin").is_none());
    assert_eq!(ws.document(), &before);
    let errors: Vec<_> = ws.log_entries(LogLevel::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message_key, LogMessage::UploadError);
}

#[tokio::test]
async fn quoted_script_names_run_as_valid_python() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);
    ws.apply_diagram(HELLO).unwrap();
    ws.rename("it's.py").unwrap();

    ws.run().await.unwrap();

    assert!(device.file_text("/user/it's.py").is_some());
    assert_eq!(
        device.executions(),
        vec![Execution::Line(r"exec(open('/user/it\'s.py').read())".into())]
    );
}

#[tokio::test]
async fn snapshot_offers_a_way_up_below_the_root() {
    let device = device();
    let prompt = ScriptedPrompt::new();
    let mut ws = workspace(&device, &prompt);

    ws.open_file_browser().await.unwrap();
    assert!(ws.snapshot().can_go_up);

    ws.change_directory("..").await.unwrap();
    assert_eq!(ws.directory().cwd(), "/");
    assert!(!ws.snapshot().can_go_up);
}
