//! Thread-per-agent mailbox runtime
//!
//! Every agent runs on its own thread, owns its state, and handles one
//! envelope at a time from its inbox. Replies go to a single channel shared
//! by all agents and read only by the coordinator loop.

use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Sender};
use log::debug;

use super::messages::Reply;

/// An independently scheduled participant in the tick protocol
pub trait Agent: Send + 'static {
    /// What the coordinator hands this agent every tick
    type Input: Send + 'static;

    /// Handle one tick's input and produce the reply for that tick
    fn act(&mut self, tick: u64, input: Self::Input) -> Reply;
}

/// Messages delivered to an agent's inbox
#[derive(Debug)]
pub enum Envelope<T> {
    Tick { tick: u64, input: T },
    Stop,
}

/// Owner side of a running agent
pub struct AgentHandle<T> {
    name: String,
    inbox: Sender<Envelope<T>>,
    thread: JoinHandle<()>,
}

impl<T: Send + 'static> AgentHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deliver one tick's input
    pub fn send(&self, tick: u64, input: T) -> Result<()> {
        self.inbox
            .send(Envelope::Tick { tick, input })
            .map_err(|_| anyhow!("agent {} is no longer running", self.name))
    }

    /// Ask the agent to finish and wait for its thread
    pub fn stop(self) -> Result<()> {
        // The agent may already have exited; joining is what matters
        let _ = self.inbox.send(Envelope::Stop);
        self.thread
            .join()
            .map_err(|_| anyhow!("agent {} panicked", self.name))
    }
}

/// Start `agent` on its own thread
pub fn spawn_agent<A: Agent>(
    name: String,
    mut agent: A,
    replies: Sender<Reply>,
) -> Result<AgentHandle<A::Input>> {
    let (inbox, mailbox) = unbounded::<Envelope<A::Input>>();
    let thread_name = name.clone();

    let thread = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            for envelope in mailbox.iter() {
                match envelope {
                    Envelope::Tick { tick, input } => {
                        let reply = agent.act(tick, input);
                        if replies.send(reply).is_err() {
                            debug!("Agent {} lost its coordinator", thread_name);
                            break;
                        }
                    }
                    Envelope::Stop => break,
                }
            }
        })
        .with_context(|| format!("Failed to spawn agent thread {name}"))?;

    Ok(AgentHandle {
        name,
        inbox,
        thread,
    })
}
