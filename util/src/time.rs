use std::time::Instant;

/// Seconds elapsed since `since`, with subsecond precision.
pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

/// 12345678 -> "12,345,678"
pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for ch in num.chars() {
        result.push(ch);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

/// "35.12s" or "2m03s", for printing how long something took.
pub fn prettyprint_time(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.2}s", seconds);
    }
    let mins = (seconds / 60.0).floor() as usize;
    format!("{}m{:02.0}s", mins, seconds - (mins as f64) * 60.0)
}

/// Hierarchically times how long pieces of a tool take, printing a summary at
/// the end. Spans must be stopped in LIFO order.
pub struct Timer {
    outermost_name: String,
    started_at: Instant,
    stack: Vec<Span>,
    results: Vec<String>,
    finished: bool,
}

struct Span {
    name: String,
    started_at: Instant,
}

impl Timer {
    pub fn new<S: Into<String>>(name: S) -> Timer {
        let name = name.into();
        info!("{}...", name);
        Timer {
            outermost_name: name,
            started_at: Instant::now(),
            stack: Vec::new(),
            results: Vec::new(),
            finished: false,
        }
    }

    pub fn start<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        info!("{}- {}...", "  ".repeat(self.stack.len() + 1), name);
        self.stack.push(Span {
            name,
            started_at: Instant::now(),
        });
    }

    pub fn stop<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        let span = self
            .stack
            .pop()
            .unwrap_or_else(|| panic!("stop({}) with nothing started", name));
        if span.name != name {
            panic!("stop({}) doesn't match start({})", name, span.name);
        }
        self.results.push(format!(
            "{}- {}: {}",
            "  ".repeat(self.stack.len() + 1),
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        ));
    }

    pub fn done(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        assert!(
            self.stack.is_empty(),
            "Timer done, but {} spans are still running",
            self.stack.len()
        );
        info!(
            "{} took {}",
            self.outermost_name,
            prettyprint_time(elapsed_seconds(self.started_at))
        );
        for line in &self.results {
            info!("{}", line);
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // If the tool bailed out with ?, don't compound the problem by
        // panicking over unbalanced spans.
        if !self.finished && self.stack.is_empty() {
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas() {
        assert_eq!(prettyprint_usize(0), "0");
        assert_eq!(prettyprint_usize(42), "42");
        assert_eq!(prettyprint_usize(1000), "1,000");
        assert_eq!(prettyprint_usize(1234567), "1,234,567");
    }

    #[test]
    fn times() {
        assert_eq!(prettyprint_time(0.5), "0.50s");
        assert_eq!(prettyprint_time(59.994), "59.99s");
        assert_eq!(prettyprint_time(60.0), "1m00s");
        assert_eq!(prettyprint_time(123.4), "2m03s");
    }

    #[test]
    fn nesting() {
        let mut timer = Timer::new("outer");
        timer.start("a");
        timer.start("b");
        timer.stop("b");
        timer.stop("a");
        timer.done();
    }

    #[test]
    #[should_panic]
    fn mismatched_stop() {
        let mut timer = Timer::new("oops");
        timer.start("a");
        timer.stop("b");
    }
}
