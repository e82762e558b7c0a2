//! Executor abstraction
//!
//! The sorted-set layer never touches the network itself: it builds a
//! `Command` and hands it to an `Executor`, which ships it and resolves the
//! raw reply. Executors are expected to resolve replies in submission
//! order per connection.

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{Command, Value};

#[async_trait]
pub trait Executor: Send + Sync {
    /// Send one command and wait for its raw reply.
    ///
    /// Error replies from the store may be returned either as
    /// `Value::Error` or as `ZsetError::Server`; the reply decoder accepts
    /// both.
    async fn execute(&self, command: Command) -> Result<Value>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for std::sync::Arc<E> {
    async fn execute(&self, command: Command) -> Result<Value> {
        (**self).execute(command).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Records every command and answers from a queue of canned replies
    #[derive(Default)]
    pub(crate) struct MockExecutor {
        commands: Mutex<Vec<Command>>,
        replies: Mutex<VecDeque<Value>>,
    }

    impl MockExecutor {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_reply(reply: Value) -> Self {
            let mock = Self::new();
            mock.push_reply(reply);
            mock
        }

        pub(crate) fn push_reply(&self, reply: Value) {
            self.replies.lock().unwrap().push_back(reply);
        }

        pub(crate) fn commands(&self) -> Vec<Command> {
            self.commands.lock().unwrap().clone()
        }

        /// The single command sent so far, as name followed by lossy args
        pub(crate) fn last_wire(&self) -> Vec<String> {
            let commands = self.commands.lock().unwrap();
            let cmd = commands.last().expect("no command was dispatched");
            std::iter::once(cmd.name().to_string())
                .chain(
                    cmd.args()
                        .iter()
                        .map(|arg| String::from_utf8_lossy(arg).to_string()),
                )
                .collect()
        }
    }

    #[async_trait]
    impl Executor for MockExecutor {
        async fn execute(&self, command: Command) -> Result<Value> {
            self.commands.lock().unwrap().push(command);
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Value::nil()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::mock::MockExecutor;
    use super::*;

    #[tokio::test]
    async fn test_arc_executor_delegates() {
        let mock = Arc::new(MockExecutor::with_reply(Value::Integer(3)));
        let shared: Arc<dyn Executor> = mock.clone();

        let reply = shared.execute(Command::new("ZCARD").arg("k")).await.unwrap();

        assert_eq!(reply, Value::Integer(3));
        assert_eq!(mock.last_wire(), vec!["ZCARD", "k"]);
    }

    #[tokio::test]
    async fn test_mock_replies_in_order() {
        let mock = MockExecutor::new();
        mock.push_reply(Value::Integer(1));
        mock.push_reply(Value::Integer(2));

        assert_eq!(mock.execute(Command::new("A")).await.unwrap(), Value::Integer(1));
        assert_eq!(mock.execute(Command::new("B")).await.unwrap(), Value::Integer(2));
        assert_eq!(mock.commands().len(), 2);
    }
}
