use crate::blockchain::Transaction;

/// Transactions waiting to be included in the next mined block.
#[derive(Debug, Default)]
pub struct PendingPool {
    transactions: Vec<Transaction>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Take every pending transaction, leaving the pool empty.
    pub fn drain_for_mining(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    /// Put transactions back ahead of anything that arrived meanwhile.
    pub fn requeue(&mut self, mut transactions: Vec<Transaction>) {
        transactions.append(&mut self.transactions);
        self.transactions = transactions;
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::PendingPool;
    use crate::blockchain::Transaction;

    #[test]
    fn drain_takes_everything_in_order() {
        let mut pool = PendingPool::new();
        pool.add(Transaction::new("alice", "one"));
        pool.add(Transaction::new("bob", "two"));

        let drained = pool.drain_for_mining();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].content, "one");
        assert_eq!(drained[1].content, "two");
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn draining_empty_pool_yields_nothing() {
        let mut pool = PendingPool::new();
        assert!(pool.drain_for_mining().is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn requeued_transactions_go_first() {
        let mut pool = PendingPool::new();
        pool.add(Transaction::new("alice", "one"));
        let drained = pool.drain_for_mining();
        pool.add(Transaction::new("bob", "two"));

        pool.requeue(drained);
        let order: Vec<_> = pool.snapshot().into_iter().map(|t| t.content).collect();
        assert_eq!(order, vec!["one", "two"]);
    }

    #[test]
    fn snapshot_does_not_consume() {
        let mut pool = PendingPool::new();
        pool.add(Transaction::new("alice", "one"));
        assert_eq!(pool.snapshot().len(), 1);
        assert_eq!(pool.len(), 1);
    }
}
