use super::state::{LogEntry, LogLevel};
use crate::error::Refusal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogMessage {
    ScriptToDiagram,
    FileNameMissing,
    FileNameEmpty,
    UnknownFileType,
    BlockViewUnavailable,
    NothingToRun,
    NothingToSave,
    InvalidPath,
    TextOverwritten,
    ReadError,
    SaveError,
    RunError,
    ListError,
    UploadError,
    NewDocument,
    FileOpened,
    FileSaved,
    Renamed,
    CodeSent,
    Uploaded,
    ViewSwitched,
}

impl LogMessage {
    pub fn level(self) -> LogLevel {
        use LogMessage::*;
        match self {
            ReadError | SaveError | RunError | ListError | UploadError => LogLevel::Error,
            ScriptToDiagram | FileNameMissing | FileNameEmpty | UnknownFileType
            | BlockViewUnavailable | NothingToRun | NothingToSave | InvalidPath
            | TextOverwritten => LogLevel::Warning,
            _ => LogLevel::Info,
        }
    }

    /// Message key and arguments describing `refusal`.
    pub fn for_refusal(refusal: &Refusal) -> (Self, Vec<String>) {
        match refusal {
            Refusal::ScriptToDiagram => (LogMessage::ScriptToDiagram, vec![]),
            Refusal::MissingFileName => (LogMessage::FileNameMissing, vec![]),
            Refusal::EmptyFileName => (LogMessage::FileNameEmpty, vec![]),
            Refusal::UnknownFileType(name) => (LogMessage::UnknownFileType, vec![name.clone()]),
            Refusal::DiagramViewUnavailable => (LogMessage::BlockViewUnavailable, vec![]),
            Refusal::NothingToRun => (LogMessage::NothingToRun, vec![]),
            Refusal::NothingToSave => (LogMessage::NothingToSave, vec![]),
            Refusal::InvalidPath(path) => (LogMessage::InvalidPath, vec![path.clone()]),
        }
    }
}

pub fn format_log(entry: &LogEntry) -> String {
    use LogMessage::*;
    let arg = |idx: usize| entry.args.get(idx).cloned().unwrap_or_default();
    match entry.message_key {
        ScriptToDiagram => "Cannot convert a Python document to a blocks document".into(),
        FileNameMissing => "You must specify a filename in order to save".into(),
        FileNameEmpty => "File name is empty".into(),
        UnknownFileType => format!("Unknown file type: {}", arg(0)),
        BlockViewUnavailable => "Block view not available".into(),
        NothingToRun => "There is no code to run".into(),
        NothingToSave => "There is no code to save".into(),
        InvalidPath => format!("Invalid path: {}", arg(0)),
        TextOverwritten => "Python changes have been overwritten!".into(),
        ReadError => format!("read error: {}", arg(0)),
        SaveError => format!("save error: {}", arg(0)),
        RunError => format!("run error: {}", arg(0)),
        ListError => format!("cannot list directory: {}", arg(0)),
        UploadError => format!("upload error: {}", arg(0)),
        NewDocument => "new document".into(),
        FileOpened => format!("opened {}", arg(0)),
        FileSaved => format!("saved {}", arg(0)),
        Renamed => format!("renamed to {}", arg(0)),
        CodeSent => format!("running {}", arg(0)),
        Uploaded => format!("uploaded {}", arg(0)),
        ViewSwitched => format!("switched to {} view", arg(0)),
    }
}
