//! Run with `cargo test --all-features`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use attrcache::{CAPACITY, Identity, Token, cache, cached_property};
use serial_test::serial;

macro_rules! test {
    (miss: $call:expr, $result:expr) => {{
        assert_eq!($call, $result);
        assert!(!attrcache::internal::last_was_hit());
    }};
    (hit: $call:expr, $result:expr) => {{
        assert_eq!($call, $result);
        assert!(attrcache::internal::last_was_hit());
    }};
}

/// Test basic memoization.
#[test]
#[serial]
fn test_basic() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    #[cache]
    fn empty() -> String {
        format!("The world is {}", "big")
    }

    #[cache]
    fn f(a: i64, b: i64) -> i64 {
        CALLS.fetch_add(1, Ordering::SeqCst);
        a + b
    }

    test!(miss: empty(), "The world is big");
    test!(hit: empty(), "The world is big");

    test!(miss: f(1, 2), 3);
    test!(hit: f(1, 2), 3);
    test!(hit: f(1, 2), 3);
    test!(hit: f(1, 2), 3);
    test!(miss: f(1, 3), 4);
    test!(hit: f(1, 3), 4);
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
}

/// Test that memoized functions can recurse.
#[test]
#[serial]
fn test_recursion() {
    #[cache]
    fn fib(n: u64) -> u64 {
        if n <= 2 { 1 } else { fib(n - 1) + fib(n - 2) }
    }

    test!(miss: fib(10), 55);
    test!(hit: fib(9), 34);
    test!(hit: fib(10), 55);
    test!(miss: fib(11), 89);
}

/// Test that the identity of an instance matters, not its value.
#[test]
#[serial]
fn test_identity() {
    #[cache]
    fn len(list: Arc<Vec<u32>>) -> usize {
        list.len()
    }

    let list = Arc::new(vec![1, 2, 3]);
    test!(miss: len(list.clone()), 3);
    test!(hit: len(list.clone()), 3);
    test!(miss: len(Arc::new(vec![1, 2, 3])), 3);
    test!(hit: len(list), 3);
}

/// Test that only parameters the body reads are part of the key.
#[test]
#[serial]
fn test_unread_parameters() {
    #[cache]
    fn first(a: u32, _b: u32) -> u32 {
        a
    }

    test!(miss: first(1, 2), 1);
    test!(hit: first(1, 3), 1);
    test!(miss: first(2, 3), 2);
}

/// Test optional arguments.
#[test]
#[serial]
fn test_option() {
    #[cache]
    fn greet(name: Option<Arc<String>>) -> String {
        match name {
            Some(name) => format!("Hello, {name}!"),
            None => "Hello!".into(),
        }
    }

    let name = Arc::new("Ferris".to_string());
    test!(miss: greet(None), "Hello!");
    test!(hit: greet(None), "Hello!");
    test!(miss: greet(Some(name.clone())), "Hello, Ferris!");
    test!(hit: greet(Some(name)), "Hello, Ferris!");
}

#[derive(Identity)]
struct Scene {
    token: Token,
    title: Arc<String>,
    size: u32,
}

impl Scene {
    fn new(title: &str, size: u32) -> Self {
        Self { token: Token::new(), title: Arc::new(title.into()), size }
    }

    #[cache]
    fn scaled(&self, factor: u32) -> u32 {
        self.size * factor
    }
}

/// Test that replacing a field that is read invalidates the result.
#[test]
#[serial]
fn test_fields() {
    #[cache]
    fn describe(scene: &Scene) -> String {
        format!("{} ({})", scene.title, scene.size)
    }

    let mut scene = Scene::new("Intro", 3);
    test!(miss: describe(&scene), "Intro (3)");
    test!(hit: describe(&scene), "Intro (3)");

    scene.size = 4;
    test!(miss: describe(&scene), "Intro (4)");

    // An equal, but distinct title is a different dependency.
    scene.title = Arc::new("Intro".into());
    test!(miss: describe(&scene), "Intro (4)");
    test!(hit: describe(&scene), "Intro (4)");

    // A different scene with equal contents is a different instance.
    let other = Scene::new("Intro", 4);
    test!(miss: describe(&other), "Intro (4)");

    test!(miss: scene.scaled(2), 8);
    test!(hit: scene.scaled(2), 8);
    test!(miss: scene.scaled(3), 12);
    scene.size = 5;
    test!(miss: scene.scaled(3), 15);
}

/// Test that a local shadowing a parameter keeps the parameter's fields as
/// dependencies.
#[test]
#[serial]
fn test_shadowing() {
    #[cache]
    fn title_len(scene: &Scene) -> usize {
        let scene = scene.title.len();
        scene
    }

    let mut scene = Scene::new("Outro", 1);
    test!(miss: title_len(&scene), 5);
    test!(hit: title_len(&scene), 5);

    scene.title = Arc::new("Much longer".into());
    test!(miss: title_len(&scene), 11);
    test!(hit: title_len(&scene), 11);
}

/// Test that arguments captured by format strings are dependencies.
#[test]
#[serial]
fn test_format_captures() {
    #[cache]
    fn greet(name: Arc<String>) -> String {
        format!("Hello, {name}!")
    }

    #[cache]
    fn pad(text: Arc<String>, width: usize) -> String {
        format!("[{text:>width$}]")
    }

    let ann = Arc::new("Ann".to_string());
    test!(miss: greet(ann.clone()), "Hello, Ann!");
    test!(hit: greet(ann), "Hello, Ann!");
    test!(miss: greet(Arc::new("Bob".into())), "Hello, Bob!");

    let text = Arc::new("ab".to_string());
    test!(miss: pad(text.clone(), 3), "[ ab]");
    test!(miss: pad(text.clone(), 4), "[  ab]");
    test!(hit: pad(text, 3), "[ ab]");
}

/// Test that reads inside macros that take no plain argument list count.
#[test]
#[serial]
fn test_macro_tokens() {
    #[cache]
    fn repeat(a: Arc<u8>, n: usize) -> Vec<u8> {
        vec![*a; n]
    }

    let one = Arc::new(1);
    test!(miss: repeat(one.clone(), 2), [1, 1]);
    test!(hit: repeat(one.clone(), 2), [1, 1]);
    test!(miss: repeat(Arc::new(2), 2), [2, 2]);
    test!(miss: repeat(one, 3), [1, 1, 1]);
}

/// Test the cached property of a plain struct.
#[test]
#[serial]
fn test_property() {
    static GETS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Identity)]
    struct Test {
        token: Token,
        attr: i64,
    }

    impl Test {
        #[cached_property]
        fn prop(&self) -> i64 {
            GETS.fetch_add(1, Ordering::SeqCst);
            1 + self.attr
        }
    }

    let mut t = Test { token: Token::new(), attr: 3 };
    test!(miss: t.prop(), 4);
    test!(hit: t.prop(), 4);
    test!(hit: t.prop(), 4);

    t.attr = 4;
    test!(miss: t.prop(), 5);
    test!(hit: t.prop(), 5);
    assert_eq!(GETS.load(Ordering::SeqCst), 2);
}

/// Test that a marked field can provide the identity.
#[test]
#[serial]
fn test_marked_identity() {
    #[derive(Identity)]
    struct Shared(#[identity] Arc<String>, u8);

    impl Shared {
        #[cached_property]
        fn doubled(&self) -> u16 {
            2 * u16::from(self.1)
        }
    }

    let text = Arc::new("shared".to_string());
    let a = Shared(text.clone(), 2);
    let b = Shared(text, 2);
    test!(miss: a.doubled(), 4);
    test!(hit: b.doubled(), 4);
}

/// Test that the cache keeps at most `CAPACITY` results.
#[test]
#[serial]
fn test_capacity() {
    #[cache]
    fn square(x: u64) -> u64 {
        x * x
    }

    let last = CAPACITY as u64;
    for i in 0..=last {
        test!(miss: square(i), i * i);
    }

    test!(hit: square(last), last * last);
    test!(hit: square(1), 1);
    test!(miss: square(0), 0);
}

/// Test that hits refresh an entry's recency.
#[test]
#[serial]
fn test_recency() {
    #[cache]
    fn cube(x: u64) -> u64 {
        x * x * x
    }

    let last = CAPACITY as u64;
    for i in 0..last {
        test!(miss: cube(i), i * i * i);
    }

    test!(hit: cube(0), 0);
    test!(miss: cube(last), last * last * last);
    test!(hit: cube(0), 0);
    test!(miss: cube(1), 1);
}
