//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端 fan-out 测试（队列 -> 分发器 -> sinks）
//! - 溢出策略行为验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use contracts::{ContractError, EventSink, Message, OverflowPolicy};
    use dispatcher::Dispatcher;
    use queue::{EnqueueOutcome, EventQueue};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::time::{sleep, timeout, Duration};

    /// Sink that records every delivered payload
    struct RecordingSink {
        name: String,
        delivered: Arc<Mutex<Vec<String>>>,
        fail_payloads: Vec<String>,
    }

    impl RecordingSink {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
            let delivered = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    delivered: Arc::clone(&delivered),
                    fail_payloads: Vec::new(),
                },
                delivered,
            )
        }

        /// Fail delivery for the given payloads, succeed otherwise
        fn failing_on(name: &str, payloads: &[&str]) -> (Self, Arc<Mutex<Vec<String>>>) {
            let (mut sink, delivered) = Self::new(name);
            sink.fail_payloads = payloads.iter().map(|p| p.to_string()).collect();
            (sink, delivered)
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn initialize(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn deliver(&mut self, message: &Message) -> Result<(), ContractError> {
            if self.fail_payloads.iter().any(|p| p == message.as_str()) {
                return Err(ContractError::sink_transport(&self.name, "induced failure"));
            }
            self.delivered
                .lock()
                .unwrap()
                .push(message.as_str().to_string());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// 端到端：无界队列，K 个 sink 各收到全部 N 条消息且顺序一致
    #[tokio::test]
    async fn test_e2e_every_sink_sees_every_message_in_order() {
        let queue = EventQueue::unbounded();
        let dispatcher = Dispatcher::new(queue.clone());

        let mut recorders = Vec::new();
        for i in 0..3 {
            let (sink, delivered) = RecordingSink::new(&format!("sink{i}"));
            dispatcher.register_sink(Box::new(sink)).await.unwrap();
            recorders.push(delivered);
        }

        let handle = dispatcher.spawn();

        let expected: Vec<String> = (0..20).map(|i| format!("event-{i}")).collect();
        for text in &expected {
            assert_eq!(
                queue.enqueue(text.as_str()).await.unwrap(),
                EnqueueOutcome::Enqueued
            );
        }

        queue.close();
        timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        for delivered in recorders {
            assert_eq!(*delivered.lock().unwrap(), expected);
        }
    }

    /// 端到端：Reject 策略下被丢弃的消息不会到达任何 sink
    #[tokio::test]
    async fn test_e2e_rejected_message_reaches_no_sink() {
        let queue = EventQueue::bounded(2, OverflowPolicy::Reject);
        let dispatcher = Dispatcher::new(queue.clone());

        let (sink, delivered) = RecordingSink::new("only");
        dispatcher.register_sink(Box::new(sink)).await.unwrap();

        // Fill the queue before the drain loop starts
        assert_eq!(queue.enqueue("A").await.unwrap(), EnqueueOutcome::Enqueued);
        assert_eq!(queue.enqueue("B").await.unwrap(), EnqueueOutcome::Enqueued);
        assert_eq!(queue.enqueue("C").await.unwrap(), EnqueueOutcome::Rejected);
        queue.close();

        dispatcher.run().await;

        assert_eq!(*delivered.lock().unwrap(), vec!["A", "B"]);
        assert_eq!(queue.metrics().rejected_count(), 1);
    }

    /// 端到端：EvictOldest 策略下恰好 B、C 被投递，A 永不投递
    #[tokio::test]
    async fn test_e2e_evicted_message_reaches_no_sink() {
        let queue = EventQueue::bounded(2, OverflowPolicy::EvictOldest);
        let dispatcher = Dispatcher::new(queue.clone());

        let (sink, delivered) = RecordingSink::new("only");
        dispatcher.register_sink(Box::new(sink)).await.unwrap();

        queue.enqueue("A").await.unwrap();
        queue.enqueue("B").await.unwrap();
        assert_eq!(queue.enqueue("C").await.unwrap(), EnqueueOutcome::Evicted);
        queue.close();

        dispatcher.run().await;

        assert_eq!(*delivered.lock().unwrap(), vec!["B", "C"]);
        assert_eq!(queue.metrics().evicted_count(), 1);
    }

    /// 端到端：单个 sink 对消息 M 投递失败，不影响兄弟 sink 收到 M 和 M2
    #[tokio::test]
    async fn test_e2e_per_sink_failure_isolation() {
        let queue = EventQueue::unbounded();
        let dispatcher = Dispatcher::new(queue.clone());
        let mut failures = dispatcher.failure_reports();

        let (flaky, flaky_delivered) = RecordingSink::failing_on("flaky", &["M"]);
        let (healthy, healthy_delivered) = RecordingSink::new("healthy");
        dispatcher.register_sink(Box::new(flaky)).await.unwrap();
        dispatcher.register_sink(Box::new(healthy)).await.unwrap();

        let handle = dispatcher.spawn();

        queue.enqueue("M").await.unwrap();
        queue.enqueue("M2").await.unwrap();
        queue.close();
        handle.await.unwrap();

        assert_eq!(*healthy_delivered.lock().unwrap(), vec!["M", "M2"]);
        assert_eq!(*flaky_delivered.lock().unwrap(), vec!["M2"]);

        let report = failures.recv().await.unwrap();
        assert_eq!(report.sink_name, "flaky");
        assert_eq!(report.message.as_str(), "M");
        // The channel closes with the drain loop
        assert!(failures.recv().await.is_none());
    }

    /// 端到端：运行中注册的 sink 只收到注册之后拉取的消息
    #[tokio::test]
    async fn test_e2e_late_registration_no_gap_filling() {
        let queue = EventQueue::unbounded();
        let dispatcher = Dispatcher::new(queue.clone());

        let (early, early_delivered) = RecordingSink::new("early");
        dispatcher.register_sink(Box::new(early)).await.unwrap();

        let handle = dispatcher.spawn();

        queue.enqueue("before").await.unwrap();
        while early_delivered.lock().unwrap().is_empty() {
            sleep(Duration::from_millis(5)).await;
        }

        let (late, late_delivered) = RecordingSink::new("late");
        dispatcher.register_sink(Box::new(late)).await.unwrap();

        queue.enqueue("after").await.unwrap();
        queue.close();
        handle.await.unwrap();

        assert_eq!(*early_delivered.lock().unwrap(), vec!["before", "after"]);
        assert_eq!(*late_delivered.lock().unwrap(), vec!["after"]);
    }

    /// 端到端：从 TOML 配置构建 TCP sink 管道并在真实监听端上接收
    #[tokio::test]
    async fn test_e2e_config_driven_tcp_pipeline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            String::from_utf8(buf).unwrap()
        });

        let config = format!(
            r#"
[queue]
capacity = 16
overflow = "wait"

[[sinks]]
name = "tcp_out"
sink_type = "tcp"
[sinks.params]
addr = "{addr}"
"#
        );
        let blueprint =
            config_loader::ConfigLoader::load_from_str(&config, config_loader::ConfigFormat::Toml)
                .unwrap();

        let queue = EventQueue::new(blueprint.queue);
        let dispatcher = dispatcher::create_dispatcher(&blueprint.sinks, queue.clone())
            .await
            .unwrap();
        let handle = dispatcher.spawn();

        queue.enqueue("line one").await.unwrap();
        queue.enqueue("line two").await.unwrap();
        queue.close();
        handle.await.unwrap();

        let received = timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, "line one\nline two\n");
    }

    /// 端到端：队列关闭后排水循环正常终止，统计一致
    #[tokio::test]
    async fn test_e2e_drain_then_stop_statistics() {
        let queue = EventQueue::unbounded();
        let dispatcher = Dispatcher::new(queue.clone());

        let (sink, _delivered) = RecordingSink::new("counting");
        dispatcher.register_sink(Box::new(sink)).await.unwrap();

        for i in 0..50 {
            queue.enqueue(format!("msg-{i}")).await.unwrap();
        }
        queue.close();

        dispatcher.run().await;

        assert_eq!(dispatcher.dispatched_count(), 50);
        let metrics = dispatcher.sink_metrics().await;
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].1.delivered_count, 50);
        assert_eq!(metrics[0].1.failure_count, 0);

        let queue_snapshot = queue.metrics().snapshot();
        assert_eq!(queue_snapshot.enqueued_count, 50);
        assert_eq!(queue_snapshot.depth, 0);

        // The hosting-side summary reflects the same counters
        let stats = observability::PipelineStats {
            enqueued: queue_snapshot.enqueued_count,
            rejected: queue_snapshot.rejected_count,
            evicted: queue_snapshot.evicted_count,
            dispatched: dispatcher.dispatched_count(),
            sinks: metrics
                .into_iter()
                .map(|(name, m)| observability::SinkStats {
                    name,
                    delivered: m.delivered_count,
                    failed: m.failure_count,
                })
                .collect(),
        };
        assert_eq!(stats.total_failures(), 0);
        assert_eq!(stats.discard_rate(), 0.0);
        assert!(format!("{stats}").contains("counting: 50 delivered, 0 failed"));
    }
}
