//! Bounded command queue
//!
//! A fixed-capacity ring buffer of parsed commands. Slots are committed on
//! completion: `dequeue` only peeks at the head, and the slot is freed by
//! `release` once the executor is done with it. A dispatch cycle that fails
//! part way can therefore be retried without losing the command.

extern crate alloc;

use alloc::vec::Vec;
use gc_model::{ParsedCommand, QueueFull};

/// Ring buffer of pending commands
pub struct CommandQueue {
    slots: Vec<Option<ParsedCommand>>,
    read_index: usize,
    write_index: usize,
    count: usize,
}

impl CommandQueue {
    /// Create a queue with `capacity` slots
    ///
    /// A capacity of zero is raised to one; configuration validation rejects
    /// it before the pipeline is built.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            read_index: 0,
            write_index: 0,
            count: 0,
        }
    }

    /// Append a command at the tail
    ///
    /// Fails without touching any slot or index when the queue is full.
    pub fn enqueue(&mut self, command: ParsedCommand) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull);
        }
        self.slots[self.write_index] = Some(command);
        self.write_index = (self.write_index + 1) % self.capacity();
        self.count += 1;
        Ok(())
    }

    /// Peek at the head slot
    pub fn dequeue(&self) -> Option<(usize, &ParsedCommand)> {
        if self.count == 0 {
            return None;
        }
        self.slots[self.read_index]
            .as_ref()
            .map(|cmd| (self.read_index, cmd))
    }

    /// Free the head slot after its command has been consumed
    ///
    /// `slot` must be the index returned by the last `dequeue`. Releasing any
    /// other slot is ignored.
    pub fn release(&mut self, slot: usize) -> Option<ParsedCommand> {
        if self.count == 0 || slot != self.read_index {
            log::warn!(
                "Ignoring release of slot {slot} (head {}, {} queued)",
                self.read_index,
                self.count
            );
            return None;
        }
        let command = self.slots[slot].take();
        self.read_index = (self.read_index + 1) % self.capacity();
        self.count -= 1;
        command
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity() - self.count
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;

    fn cmd(text: &str) -> ParsedCommand {
        ParsedCommand::plain(text)
    }

    #[test]
    fn test_fifo_order() {
        let mut q = CommandQueue::new(4);
        q.enqueue(cmd("G28")).unwrap();
        q.enqueue(cmd("G1 X1")).unwrap();

        let (slot, head) = q.dequeue().unwrap();
        assert_eq!(head.text(), "G28");
        assert_eq!(q.release(slot).unwrap().text(), "G28");

        let (slot, head) = q.dequeue().unwrap();
        assert_eq!(head.text(), "G1 X1");
        q.release(slot);
        assert!(q.is_empty());
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn test_dequeue_is_a_peek() {
        let mut q = CommandQueue::new(2);
        q.enqueue(cmd("M105")).unwrap();
        let (first, _) = q.dequeue().unwrap();
        let (second, _) = q.dequeue().unwrap();
        assert_eq!(first, second);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_full_queue_rejects_without_mutation() {
        let mut q = CommandQueue::new(2);
        q.enqueue(cmd("A")).unwrap();
        q.enqueue(cmd("B")).unwrap();
        assert!(q.is_full());
        assert_eq!(q.free_slots(), 0);

        assert_eq!(q.enqueue(cmd("C")), Err(QueueFull));
        assert_eq!(q.len(), 2);
        let (slot, head) = q.dequeue().unwrap();
        assert_eq!(slot, 0);
        assert_eq!(head.text(), "A");
    }

    #[test]
    fn test_wraparound() {
        let mut q = CommandQueue::new(3);
        for round in 0..10 {
            q.enqueue(cmd(&format!("G1 X{round}"))).unwrap();
            q.enqueue(cmd(&format!("G1 Y{round}"))).unwrap();
            let (slot, head) = q.dequeue().unwrap();
            assert_eq!(head.text(), format!("G1 X{round}"));
            assert!(slot < 3);
            q.release(slot);
            let (slot, head) = q.dequeue().unwrap();
            assert_eq!(head.text(), format!("G1 Y{round}"));
            q.release(slot);
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_release_wrong_slot_ignored() {
        let mut q = CommandQueue::new(3);
        q.enqueue(cmd("A")).unwrap();
        q.enqueue(cmd("B")).unwrap();
        assert!(q.release(1).is_none());
        assert_eq!(q.len(), 2);
        assert!(CommandQueue::new(3).release(0).is_none());
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let q = CommandQueue::new(0);
        assert_eq!(q.capacity(), 1);
    }
}
