use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::FetchError;
use crate::state::{Delta, ProviderCommand, Records, View, view_label};

/// Identifies one load: the view it was issued for and a monotonically
/// increasing epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub epoch: u64,
    pub view: View,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Loading,
    Succeeded(Records),
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn records(&self) -> Option<&Records> {
        match self {
            RequestState::Succeeded(records) => Some(records),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// The ticket is not the active one; state was left untouched.
    Stale,
}

/// Owns the request lifecycle of the active view.
///
/// Only the most recently issued ticket may change the state. Completions for
/// older tickets are reported as [`Completion::Stale`] and discarded.
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    epoch: u64,
    active: Option<Ticket>,
    state: RequestState,
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self {
            epoch: 0,
            active: None,
            state: RequestState::Idle,
        }
    }

    pub fn begin(&mut self, view: View) -> Ticket {
        self.epoch += 1;
        let ticket = Ticket {
            epoch: self.epoch,
            view,
        };
        self.active = Some(ticket);
        self.state = RequestState::Loading;
        ticket
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<Records, FetchError>,
    ) -> Completion {
        if self.active != Some(ticket) || !self.state.is_loading() {
            return Completion::Stale;
        }
        match outcome {
            Ok(records) if records.view() == ticket.view => {
                self.state = RequestState::Succeeded(records);
                Completion::Applied
            }
            Ok(records) => {
                self.state = RequestState::Failed(format!(
                    "unexpected {} payload for {} view",
                    view_label(records.view()),
                    view_label(ticket.view)
                ));
                Completion::Failed
            }
            Err(err) => {
                self.state = RequestState::Failed(err.to_string());
                Completion::Failed
            }
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn active(&self) -> Option<Ticket> {
        self.active
    }
}

/// Where records come from. Implementations block; the provider runs each
/// call on its own worker thread.
pub trait ResourceSource: Send + Sync + 'static {
    fn fetch(&self, view: View) -> Result<Records, FetchError>;

    fn describe(&self, view: View) -> String {
        view.endpoint().to_string()
    }
}

/// Run the provider loop on a background thread.
///
/// Commands queued behind each other are coalesced: only the newest ticket
/// starts a request. A queued `Shutdown` ends the loop even when fetches are
/// queued behind it. Every started request reports back through
/// [`Delta::Fetched`], whether or not it is still wanted.
pub fn spawn_provider(
    source: Arc<dyn ResourceSource>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let mut latest = cmd;
            while !matches!(latest, ProviderCommand::Shutdown) {
                let Ok(next) = cmd_rx.try_recv() else {
                    break;
                };
                if let ProviderCommand::Fetch(skipped) = latest {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Skipped superseded {} request (#{})",
                        view_label(skipped.view),
                        skipped.epoch
                    )));
                }
                latest = next;
            }

            let ticket = match latest {
                ProviderCommand::Fetch(ticket) => ticket,
                ProviderCommand::Shutdown => break,
            };

            let _ = tx.send(Delta::Log(format!(
                "[INFO] GET {}",
                source.describe(ticket.view)
            )));
            let source = source.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let outcome = source.fetch(ticket.view);
                let _ = tx.send(Delta::Fetched { ticket, outcome });
            });
        }
    })
}
