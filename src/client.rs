use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use log::{debug, error, info};
use crate::BrokerFoot;

/// Public API for the broker backend - owns the task
pub struct BrokerBackend
{   hand: crate::BrokerHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl BrokerBackend
{   /// Spawn the backend loop around `broker`.
    /// Returns immediately - spawns background task
    pub fn new(broker: crate::Broker) -> Self
    {   debug!("Creating BrokerBackend with task ownership");

        let (send_prompt_tx, send_prompt_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::BrokerHand
        {   send_prompt_tx
          , kill_process_tx
        };

        let foot = crate::BrokerFoot
        {   send_prompt_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, broker).await
        });

        BrokerBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a prompt - returns almost immediately
    pub async fn send_prompt(
      &self
    , prompt: String
    , config: Option<crate::RequestConfig>
    , entry: crate::EntryPoint
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SendPromptReply>,
        crate::error::Error
      >
    {   debug!("send_prompt queuing {:?} command", entry);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SendPromptArgs
        {   prompt
          , config
          , entry
          , reply: reply_tx
        };

        self.hand.send_prompt_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend; in-flight prompts are cancelled
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down BrokerBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend stopped without confirming shutdown");
            Err(crate::error::Error::Other(
              "Backend stopped without confirming shutdown".to_string()
            ))
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only queues: every prompt is spawned onto its own
/// task, so slow providers never hold up the next command.
async fn run_backend_loop(
  foot: crate::BrokerFoot
, broker: crate::Broker
)
{   debug!("Starting BrokerBackend event loop");
    let shutdown = CancellationToken::new();
    let BrokerFoot
    {   mut send_prompt_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = send_prompt_rx.recv() => {
          debug!("Received SendPrompt for {:?}", cmd.entry);
          let broker = broker.clone();
          let cancel = shutdown.child_token();
          tokio::spawn(async move {
            let result = broker
              .run(cmd.entry, &cmd.prompt, cmd.config.as_ref(), &cancel)
              .await;
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          shutdown.cancel();
          let _ = cmd.reply.send(Ok(()));
          info!("BrokerBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          shutdown.cancel();
          break;
        }
      }
    }
}
