#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum DownloadCommand {
    LinkUp,
    LinkDown,
    RequestAcked,
    BodyStarted,
    BodyCleared,
    AttemptAborted,
    Complete,
    Cancel,
    Reset,
}
