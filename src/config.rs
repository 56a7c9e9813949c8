use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Total size of the simulated transfer, in bytes.
    #[arg(short, long, default_value_t = 1000)]
    pub size: usize,

    /// Size of each producer write and each consumer read, in bytes.
    #[arg(short, long, default_value_t = 100)]
    pub chunk_size: usize,

    /// Delay after each producer write, in milliseconds.
    #[arg(short, long, default_value_t = 10)]
    pub write_delay_ms: u64,

    /// Read timeout of the stream pair, in milliseconds.
    #[arg(short, long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Order in which the producer writes its chunks.
    #[arg(short, long, value_enum, default_value_t = Order::Sequential)]
    pub order: Order,

    /// Skip explicit completion, leaving it to the producer dropping its stream.
    #[arg(long)]
    pub no_complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Chunks in ascending offset order.
    Sequential,

    /// Chunks in descending offset order.
    Reverse,

    /// Even chunks first, then odd chunks.
    Interleaved,
}

impl Order {
    /// The chunk indices of a transfer of `count` chunks, in this order.
    pub fn chunks(self, count: usize) -> Vec<usize> {
        match self {
            Order::Sequential => (0..count).collect(),
            Order::Reverse => (0..count).rev().collect(),
            Order::Interleaved => (0..count).step_by(2).chain((1..count).step_by(2)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders() {
        assert_eq!(Order::Sequential.chunks(4), vec![0, 1, 2, 3]);
        assert_eq!(Order::Reverse.chunks(4), vec![3, 2, 1, 0]);
        assert_eq!(Order::Interleaved.chunks(5), vec![0, 2, 4, 1, 3]);
        assert!(Order::Interleaved.chunks(0).is_empty());
    }

    #[test]
    fn test_parse() {
        let config = Config::parse_from(["scatter_gather", "--size", "400", "--order", "reverse"]);

        assert_eq!(config.size, 400);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.order, Order::Reverse);
        assert!(!config.no_complete);
    }
}
