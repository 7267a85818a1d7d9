use rmtweet::config::DATE_FORMAT;
use rmtweet::model::Tweet;
use rmtweet::{Confirmer, Notifier};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SUMMARY_LEN: usize = 100;

/// One line description of a tweet: date, author, reply target and text.
pub fn line(tweet: &Tweet) -> String {
    let text = &tweet.text;
    let mut n = text.len().min(SUMMARY_LEN);
    while !text.is_char_boundary(n) {
        n -= 1;
    }
    if let Some(i) = text[..n].find('\n') {
        n = i;
    }
    let text = if n < text.len() {
        format!("{}...", &text[..n])
    } else {
        text.clone()
    };
    let to = match &tweet.in_reply_to_screen_name {
        Some(name) if !name.is_empty() => format!(" to @{name}"),
        _ => String::new(),
    };
    format!(
        "{}: {}{}: {}",
        tweet.created_at.format(DATE_FORMAT),
        tweet.user.screen_name,
        to,
        text
    )
}

/// Asks on the terminal before each deletion.
///
/// Closed or unreadable input interrupts the run.
pub struct TerminalConfirmer {
    cancel: CancellationToken,
}

impl TerminalConfirmer {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, tweet: &Tweet) -> bool {
        eprint!("destroy this?\n  {}\n", line(tweet));
        io::stderr().flush().ok();
        let answer = tokio::task::block_in_place(|| read_answer(&mut io::stdin().lock()));
        match answer {
            Ok(Some(yes)) => yes,
            Ok(None) => {
                log::warn!("No more answers on standard input");
                self.cancel.cancel();
                false
            }
            Err(e) => {
                log::warn!("Unable to read answer: {}", e);
                self.cancel.cancel();
                false
            }
        }
    }
}

/// Reads one answer line, `None` at end of input.
fn read_answer(input: &mut impl BufRead) -> io::Result<Option<bool>> {
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(None);
    }
    Ok(Some(answer.contains('y')))
}

/// Counts destroyed tweets, optionally logging each one.
#[derive(Clone)]
pub struct Report {
    count: Arc<AtomicUsize>,
    verbose: bool,
}

impl Report {
    pub fn new(verbose: bool) -> Self {
        Self {
            count: Default::default(),
            verbose,
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Notifier for Report {
    fn destroyed(&self, tweet: &Tweet) {
        self.count.fetch_add(1, Ordering::Relaxed);
        if self.verbose {
            log::info!("destroyed\n  {}", line(tweet));
        }
    }
}
