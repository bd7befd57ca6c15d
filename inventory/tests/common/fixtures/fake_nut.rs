//! Minimal NUT daemon on a local port. Each connection receives one command,
//! gets the programmed reply and is then drained until the client hangs up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct FakeNutServer {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FakeNutServer {
    /// Start the daemon with a command -> reply table. Unknown commands get
    /// `ERR UNKNOWN-COMMAND`.
    pub async fn start(replies: HashMap<String, String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake NUT daemon");
        let port = listener.local_addr().expect("No local address").port();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(replies);

        let seen = commands.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let replies = replies.clone();
                let seen = seen.clone();

                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let mut reader = BufReader::new(read_half);
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let command = line.trim().to_string();
                    seen.lock().unwrap().push(command.clone());

                    let reply = replies
                        .get(&command)
                        .cloned()
                        .unwrap_or_else(|| "ERR UNKNOWN-COMMAND\n".to_string());
                    let _ = write_half.write_all(reply.as_bytes()).await;

                    let mut rest = Vec::new();
                    let _ = reader.read_to_end(&mut rest).await;
                });
            }
        });

        Self {
            port,
            commands,
            handle,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Commands received so far, in arrival order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Drop for FakeNutServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Replies for one device named `ups` with a typical variable set and one client
pub fn single_ups_replies() -> HashMap<String, String> {
    let mut replies = HashMap::new();
    replies.insert(
        "LIST UPS".to_string(),
        "BEGIN LIST UPS\nUPS ups \"Rack UPS\"\nEND LIST UPS\n".to_string(),
    );
    replies.insert(
        "LIST VAR ups".to_string(),
        concat!(
            "BEGIN LIST VAR ups\n",
            "VAR ups ups.model \"Smart-UPS 1500\"\n",
            "VAR ups battery.charge \"98\"\n",
            "VAR ups battery.runtime \"1830.0\"\n",
            "VAR ups ups.load \"23.5\"\n",
            "VAR ups ups.status \"OL\"\n",
            "VAR ups input.voltage \"230.1\"\n",
            "VAR ups output.voltage \"n/a\"\n",
            "END LIST VAR ups\n",
        )
        .to_string(),
    );
    replies.insert(
        "LIST CLIENT ups".to_string(),
        "BEGIN LIST CLIENT ups\nCLIENT ups 192.168.1.20\nCLIENT ups 192.168.1.21\nEND LIST CLIENT ups\n"
            .to_string(),
    );
    replies
}
