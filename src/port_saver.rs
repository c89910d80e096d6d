use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use tokio::sync::watch;

/// A fairing that publishes the bound port at liftoff, and the handle that
/// waits for it. Needed when the server is configured with port 0.
pub fn create_pair() -> (PortSaver, Port) {
    let (sender, receiver) = watch::channel(None);
    (PortSaver { sender }, Port { receiver })
}

pub struct Port {
    receiver: watch::Receiver<Option<u16>>,
}

impl Port {
    /// Waits for liftoff. `None` if the server went away without binding.
    pub async fn get(&mut self) -> Option<u16> {
        loop {
            if let Some(port) = *self.receiver.borrow() {
                return Some(port);
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
        }
    }
}

pub struct PortSaver {
    sender: watch::Sender<Option<u16>>,
}

#[rocket::async_trait]
impl Fairing for PortSaver {
    fn info(&self) -> Info {
        Info {
            name: "Port Saver",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let port = rocket.config().port;
        tracing::info!(port, "Server lifted off");
        if self.sender.send(Some(port)).is_err() {
            tracing::debug!("Nobody is waiting for the bound port");
        }
    }
}
