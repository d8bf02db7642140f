//! In-memory order cache.
//!
//! A single actor owns the cached views and processes requests one at a time,
//! so concurrent writers to the same order id resolve last-writer-wins.
//! [`OrderCacheClient`] is the clonable handle everything else talks to.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

use crate::domain::{Order, OrderStatus};
use crate::error::OrderError;

/// Which cached collection a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderView {
    /// Privileged listing of every order
    All,
    /// The caller's own orders
    Mine,
    /// The order currently open in the UI
    Current,
}

pub type Response<T> = oneshot::Sender<T>;

#[derive(Debug)]
pub enum CacheRequest {
    ReplaceView {
        view: OrderView,
        orders: Vec<Order>,
        respond_to: Response<()>,
    },
    SetCurrent {
        order: Option<Order>,
        respond_to: Response<()>,
    },
    ApplyStatus {
        order_id: i64,
        status: OrderStatus,
        respond_to: Response<usize>,
    },
    Snapshot {
        view: OrderView,
        respond_to: Response<Vec<Order>>,
    },
    Get {
        view: OrderView,
        order_id: i64,
        respond_to: Response<Option<Order>>,
    },
}

#[derive(Default)]
struct CachedViews {
    all: Vec<Order>,
    mine: Vec<Order>,
    current: Option<Order>,
}

impl CachedViews {
    fn view(&self, view: OrderView) -> Vec<Order> {
        match view {
            OrderView::All => self.all.clone(),
            OrderView::Mine => self.mine.clone(),
            OrderView::Current => self.current.iter().cloned().collect(),
        }
    }

    fn find(&self, view: OrderView, order_id: i64) -> Option<Order> {
        match view {
            OrderView::All => self.all.iter().find(|o| o.id == order_id).cloned(),
            OrderView::Mine => self.mine.iter().find(|o| o.id == order_id).cloned(),
            OrderView::Current => self.current.clone().filter(|o| o.id == order_id),
        }
    }

    /// Updates every view holding `order_id`; returns how many views changed.
    fn apply_status(&mut self, order_id: i64, status: &OrderStatus) -> usize {
        let lists = [&mut self.all, &mut self.mine];
        let mut touched = 0;
        for list in lists {
            if let Some(order) = list.iter_mut().find(|o| o.id == order_id) {
                order.status = status.clone();
                touched += 1;
            }
        }
        if let Some(order) = self.current.as_mut().filter(|o| o.id == order_id) {
            order.status = status.clone();
            touched += 1;
        }
        touched
    }
}

pub struct OrderCache {
    receiver: mpsc::Receiver<CacheRequest>,
    views: CachedViews,
}

impl OrderCache {
    pub fn new(buffer_size: usize) -> (Self, OrderCacheClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            views: CachedViews::default(),
        };
        (actor, OrderCacheClient { sender })
    }

    #[instrument(name = "order_cache", skip(self))]
    pub async fn run(mut self) {
        info!("OrderCache starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CacheRequest::ReplaceView { view, orders, respond_to } => {
                    debug!(?view, count = orders.len(), "Replacing view");
                    self.replace_view(view, orders);
                    let _ = respond_to.send(());
                }
                CacheRequest::SetCurrent { order, respond_to } => {
                    self.views.current = order;
                    let _ = respond_to.send(());
                }
                CacheRequest::ApplyStatus { order_id, status, respond_to } => {
                    let touched = self.views.apply_status(order_id, &status);
                    debug!(order_id, %status, touched, "Applied status");
                    let _ = respond_to.send(touched);
                }
                CacheRequest::Snapshot { view, respond_to } => {
                    let _ = respond_to.send(self.views.view(view));
                }
                CacheRequest::Get { view, order_id, respond_to } => {
                    let _ = respond_to.send(self.views.find(view, order_id));
                }
            }
        }
        info!("OrderCache stopped");
    }

    fn replace_view(&mut self, view: OrderView, orders: Vec<Order>) {
        match view {
            OrderView::All => self.views.all = orders,
            OrderView::Mine => self.views.mine = orders,
            OrderView::Current => self.views.current = orders.into_iter().next(),
        }
    }
}

#[derive(Clone)]
pub struct OrderCacheClient {
    sender: mpsc::Sender<CacheRequest>,
}

impl OrderCacheClient {
    #[cfg(test)]
    pub fn from_sender(sender: mpsc::Sender<CacheRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(&self, build: impl FnOnce(Response<T>) -> CacheRequest) -> Result<T, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| OrderError::ActorCommunicationError("Order cache closed".to_string()))?;
        response
            .await
            .map_err(|_| OrderError::ActorCommunicationError("Order cache dropped".to_string()))
    }

    pub async fn replace_view(&self, view: OrderView, orders: Vec<Order>) -> Result<(), OrderError> {
        self.call(|respond_to| CacheRequest::ReplaceView { view, orders, respond_to }).await
    }

    pub async fn set_current(&self, order: Option<Order>) -> Result<(), OrderError> {
        self.call(|respond_to| CacheRequest::SetCurrent { order, respond_to }).await
    }

    /// Returns the number of views that held the order.
    pub async fn apply_status(&self, order_id: i64, status: OrderStatus) -> Result<usize, OrderError> {
        self.call(|respond_to| CacheRequest::ApplyStatus { order_id, status, respond_to }).await
    }

    pub async fn snapshot(&self, view: OrderView) -> Result<Vec<Order>, OrderError> {
        self.call(|respond_to| CacheRequest::Snapshot { view, respond_to }).await
    }

    pub async fn get(&self, view: OrderView, order_id: i64) -> Result<Option<Order>, OrderError> {
        self.call(|respond_to| CacheRequest::Get { view, order_id, respond_to }).await
    }
}
