use flume::{Receiver, Sender};

use crate::api::location::Coordinates;

/// Messages from the location acquirer to the resource fetcher.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// New coordinates are stored in the state; fetch for them.
    CoordinatesChanged(Coordinates),
}

/// Messages sent from the panel tasks to whoever draws the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreToUi {
    /// State changed; redraw.
    Changed,
}

/// Channel ends held by the panel tasks.
#[derive(Debug, Clone)]
pub struct Bus {
    pub location_tx: Sender<LocationEvent>,
    pub core_tx: Sender<CoreToUi>,
}

impl Bus {
    pub fn new(location_tx: Sender<LocationEvent>, core_tx: Sender<CoreToUi>) -> Self {
        Self {
            location_tx,
            core_tx,
        }
    }

    /// Wake the front end. A closed receiver only means nobody is drawing.
    pub fn notify(&self, msg: CoreToUi) {
        if self.core_tx.send(msg).is_err() {
            log::trace!("no UI listening for panel updates");
        }
    }
}

/// Block until one event is available, then drain the queue and return only
/// the newest one. Returns `None` once every sender is gone.
pub async fn recv_latest(rx: &Receiver<LocationEvent>) -> Option<LocationEvent> {
    let mut latest = rx.recv_async().await.ok()?;
    while let Ok(newer) = rx.try_recv() {
        log::debug!("Coalescing superseded location event {latest:?}");
        latest = newer;
    }
    Some(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recv_latest_coalesces() {
        let (tx, rx) = flume::unbounded();
        tx.send(LocationEvent::CoordinatesChanged(Coordinates::new(1.0, 1.0)))
            .unwrap();
        tx.send(LocationEvent::CoordinatesChanged(Coordinates::new(2.0, 2.0)))
            .unwrap();
        tx.send(LocationEvent::CoordinatesChanged(Coordinates::new(3.0, 3.0)))
            .unwrap();

        assert_eq!(
            recv_latest(&rx).await,
            Some(LocationEvent::CoordinatesChanged(Coordinates::new(3.0, 3.0)))
        );
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_recv_latest_closed() {
        let (tx, rx) = flume::unbounded::<LocationEvent>();
        drop(tx);
        assert_eq!(recv_latest(&rx).await, None);
    }
}
