//! Async front door: feeds utterances from a channel into the engine and
//! turns an elapsed input window into a silence turn.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::error::EngineError;

use super::collaborators::{Device, Nlg, Nlu};
use super::{DialogueMoveEngine, Input, TurnOutput};

pub struct TurnDriver {
    inputs: mpsc::Receiver<String>,
    /// How long to wait for input before running a silence turn.
    window: Duration,
}

impl TurnDriver {
    pub fn new(inputs: mpsc::Receiver<String>, window: Duration) -> Self {
        Self { inputs, window }
    }

    /// The next turn input, or `None` once the channel closes.
    pub async fn next_input(&mut self) -> Option<Input> {
        match tokio::time::timeout(self.window, self.inputs.recv()).await {
            Ok(Some(text)) => Some(Input::Utterance(text)),
            Ok(None) => None,
            Err(_) => Some(Input::Silence),
        }
    }

    /// Drive the engine until the channel closes or the session reaches
    /// its closing phase. Each output is handed to the callback as soon as
    /// the turn completes.
    pub async fn run<N: Nlu, G: Nlg, D: Device>(
        mut self,
        engine: &mut DialogueMoveEngine<N, G, D>,
        mut on_output: impl FnMut(TurnOutput),
    ) -> Result<(), EngineError> {
        info!("dialogue driver started");
        while let Some(input) = self.next_input().await {
            let output = engine.process_turn(input).await?;
            let closing = output.closing;
            on_output(output);
            if closing {
                break;
            }
        }
        info!("dialogue driver stopped");
        Ok(())
    }
}
