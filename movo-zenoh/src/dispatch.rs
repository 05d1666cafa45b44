/// Drains everything queued behind `first` and returns the newest item
///
/// Also returns how many stale items were skipped.
pub fn keep_latest<T>(first: T, mut try_next: impl FnMut() -> Option<T>) -> (T, usize) {
    let mut latest = first;
    let mut dropped = 0;
    while let Some(next) = try_next() {
        latest = next;
        dropped += 1;
    }
    (latest, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn nothing_queued_keeps_first() {
        let (latest, dropped) = keep_latest(1, || None::<i32>);
        assert_eq!(latest, 1);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn backlog_collapses_to_newest() {
        let mut backlog: VecDeque<_> = vec![2, 3, 4].into();
        let (latest, dropped) = keep_latest(1, || backlog.pop_front());
        assert_eq!(latest, 4);
        assert_eq!(dropped, 3);
        assert!(backlog.is_empty());
    }

    #[tokio::test]
    async fn only_latest_trigger_survives_a_burst() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        for goal in ["left", "right", "left", "right"] {
            sender.send(goal).unwrap();
        }
        let first = receiver.recv().await.unwrap();
        let (latest, dropped) = keep_latest(first, || receiver.try_recv().ok());
        assert_eq!(latest, "right");
        assert_eq!(dropped, 3);

        sender.send("left").unwrap();
        let first = receiver.recv().await.unwrap();
        assert_eq!(keep_latest(first, || receiver.try_recv().ok()), ("left", 0));
    }
}
