use std::sync::atomic::{AtomicUsize, Ordering};

static SUMS: AtomicUsize = AtomicUsize::new(0);

#[test]
fn test_simple() {
    assert_eq!(sum(1, 2), 3); // [Miss] The cache is empty.
    assert_eq!(sum(1, 2), 3); // [Hit] Same numbers.
    assert_eq!(sum(1, 2), 3); // [Hit] Same numbers.
    assert_eq!(sum(1, 2), 3); // [Hit] Same numbers.
    assert_eq!(sum(1, 3), 4); // [Miss] Different numbers.
    assert_eq!(sum(1, 3), 4); // [Hit] Same numbers as before.
    assert_eq!(SUMS.load(Ordering::SeqCst), 2);
}

/// Compute the sum of two numbers.
#[attrcache::cache]
fn sum(a: u32, b: u32) -> u32 {
    SUMS.fetch_add(1, Ordering::SeqCst);
    a + b
}
