// User-facing prompts: one-line notices and yes/no confirmations

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

pub trait Confirmer: Send + Sync {
    /// `true` only on an explicit yes
    fn confirm(&self, question: &str) -> bool;
}
