#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    StateGet,
    RowsLoad,
    BatchSetSize,
    BatchSetIndex,
    BatchPrevious,
    BatchNext,
    PayloadGenerate,
    ResponseSet,
    ResponseParse,
    ThemeToggle,
    ThemeSet,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "state.get" => Command::StateGet,
            "rows.load" => Command::RowsLoad,
            "batch.set_size" => Command::BatchSetSize,
            "batch.set_index" => Command::BatchSetIndex,
            "batch.previous" => Command::BatchPrevious,
            "batch.next" => Command::BatchNext,
            "payload.generate" => Command::PayloadGenerate,
            "response.set" => Command::ResponseSet,
            "response.parse" => Command::ResponseParse,
            "theme.toggle" => Command::ThemeToggle,
            "theme.set" => Command::ThemeSet,
            _ => Command::Unknown,
        }
    }
}
