//! # Concurrent Subscribe and Publish
//!
//! Subscribers register while other threads publish. Every publish must see a
//! whole dispatch sequence: each listener in it invoked once, none skipped,
//! and sequences only ever grow.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use driver_events::{listens_to, EventHub, EventPublisher, Listener};

    const SUBSCRIBERS: usize = 16;
    const PUBLISHERS: usize = 4;
    const EVENTS_PER_PUBLISHER: usize = 500;

    #[derive(Debug)]
    struct Tick;

    #[derive(Debug)]
    struct Tock;

    #[derive(Default)]
    struct Counter {
        ticks: AtomicUsize,
        tocks: AtomicUsize,
    }

    impl Listener<Tick> for Counter {
        fn apply(&self, _: &Tick) -> anyhow::Result<()> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Listener<Tock> for Counter {
        fn apply(&self, _: &Tock) -> anyhow::Result<()> {
            self.tocks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    listens_to!(Counter => Tick, Tock);

    #[test]
    fn test_concurrent_subscribe_and_publish() {
        let hub = Arc::new(EventHub::new());
        let counters: Vec<Arc<Counter>> = (0..SUBSCRIBERS)
            .map(|_| Arc::new(Counter::default()))
            .collect();
        let barrier = Arc::new(Barrier::new(SUBSCRIBERS + PUBLISHERS));

        let subscribers: Vec<_> = counters
            .iter()
            .map(|counter| {
                let hub = Arc::clone(&hub);
                let counter = Arc::clone(counter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    hub.subscribe(counter).unwrap();
                })
            })
            .collect();

        let publishers: Vec<_> = (0..PUBLISHERS)
            .map(|_| {
                let hub = Arc::clone(&hub);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut seen = Vec::with_capacity(EVENTS_PER_PUBLISHER);
                    for _ in 0..EVENTS_PER_PUBLISHER {
                        seen.push(hub.publish(Tick).unwrap());
                    }
                    seen
                })
            })
            .collect();

        for handle in subscribers {
            handle.join().unwrap();
        }
        let mut delivered = 0;
        for handle in publishers {
            let seen = handle.join().unwrap();
            assert!(seen.windows(2).all(|w| w[0] <= w[1]), "sequence shrank: {seen:?}");
            assert!(seen.iter().all(|&n| n <= SUBSCRIBERS));
            delivered += seen.iter().sum::<usize>();
        }

        let received: usize = counters
            .iter()
            .map(|c| c.ticks.load(Ordering::SeqCst))
            .sum();
        assert_eq!(received, delivered);

        // Every completed subscription is visible to a later publish.
        assert_eq!(hub.listener_count::<Tick>(), SUBSCRIBERS);
        assert_eq!(hub.publish(Tock).unwrap(), SUBSCRIBERS);
        assert!(counters.iter().all(|c| c.tocks.load(Ordering::SeqCst) == 1));
        assert_eq!(
            hub.events_published(),
            (PUBLISHERS * EVENTS_PER_PUBLISHER + 1) as u64
        );
    }

    #[test]
    fn test_concurrent_multi_type_registration() {
        let hub = Arc::new(EventHub::new());
        let handles: Vec<_> = (0..SUBSCRIBERS)
            .map(|_| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || hub.subscribe(Arc::new(Counter::default())).unwrap())
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(hub.listener_count::<Tick>(), SUBSCRIBERS);
        assert_eq!(hub.listener_count::<Tock>(), SUBSCRIBERS);
    }

    #[test]
    fn test_publish_from_many_threads_without_subscribers() {
        let hub = Arc::new(EventHub::new());
        let handles: Vec<_> = (0..PUBLISHERS)
            .map(|_| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || {
                    (0..EVENTS_PER_PUBLISHER)
                        .map(|_| hub.publish(Tick).unwrap())
                        .sum::<usize>()
                })
            })
            .collect();

        let delivered: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(delivered, 0);
        assert_eq!(
            hub.events_published(),
            (PUBLISHERS * EVENTS_PER_PUBLISHER) as u64
        );
    }
}
