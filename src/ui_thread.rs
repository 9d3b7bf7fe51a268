//! Travail adressé au thread UI depuis n'importe quel thread.
//!
//! Le client vit sur le thread UI et n'est pas `Send`. Un autre thread ne
//! peut que poster une tâche, que la boucle d'événements exécute ensuite
//! dans l'ordre d'arrivée.

use std::thread::{self, ThreadId};

/// File vers la boucle d'événements du thread UI.
pub trait UiSink<T>: Send {
    /// `false` si la boucle est terminée.
    fn post(&self, task: T) -> bool;
}

/// Ce qu'il est advenu d'une tâche.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Exécutée tout de suite, sur le thread UI.
    Ran,
    /// Postée à la boucle du thread UI.
    Posted,
    /// Perdue : la boucle est terminée.
    Dropped,
}

/// Poignée vers le thread UI, `Send + Clone` dès que la file l'est.
#[derive(Debug, Clone)]
pub struct UiThread<S> {
    sink: S,
    ui_thread: ThreadId,
}

impl<S> UiThread<S> {
    /// À créer sur le thread UI.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            ui_thread: thread::current().id(),
        }
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Sur le thread UI, `run` traite `task` immédiatement. Ailleurs `task`
    /// est postée et `run` n'est jamais appelée.
    pub fn run_or_post<T>(&self, task: T, run: impl FnOnce(T)) -> Dispatch
    where
        S: UiSink<T>,
    {
        if self.is_current() {
            run(task);
            Dispatch::Ran
        } else {
            self.post(task)
        }
    }

    /// Toujours postée, même depuis le thread UI.
    pub fn post<T>(&self, task: T) -> Dispatch
    where
        S: UiSink<T>,
    {
        if self.sink.post(task) {
            Dispatch::Posted
        } else {
            Dispatch::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::mpsc::{self, Receiver, Sender};

    use super::*;

    impl<T: Send> UiSink<T> for Sender<T> {
        fn post(&self, task: T) -> bool {
            self.send(task).is_ok()
        }
    }

    fn ui() -> (UiThread<Sender<u32>>, Receiver<u32>) {
        let (tx, rx) = mpsc::channel();
        (UiThread::new(tx), rx)
    }

    #[test]
    fn test_runs_inline_on_ui_thread() {
        let (ui, rx) = ui();
        let ran = RefCell::new(Vec::new());
        assert!(ui.is_current());
        assert_eq!(ui.run_or_post(7, |task| ran.borrow_mut().push(task)), Dispatch::Ran);
        assert_eq!(ran.into_inner(), vec![7]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_posts_from_background_thread() {
        let (ui, rx) = ui();
        let remote = ui.clone();
        let outcome = thread::spawn(move || {
            assert!(!remote.is_current());
            remote.run_or_post(3, |_| panic!("must not run off the UI thread"))
        })
        .join()
        .unwrap();

        assert_eq!(outcome, Dispatch::Posted);
        assert_eq!(rx.try_recv(), Ok(3));
    }

    #[test]
    fn test_posts_keep_order() {
        let (ui, rx) = ui();
        let remote = ui.clone();
        thread::spawn(move || {
            for task in 0..5 {
                assert_eq!(remote.post(task), Dispatch::Posted);
            }
        })
        .join()
        .unwrap();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_dropped_after_loop_exit() {
        let (ui, rx) = ui();
        drop(rx);
        assert_eq!(ui.post(1), Dispatch::Dropped);
        let remote = ui.clone();
        let outcome = thread::spawn(move || remote.run_or_post(1, |_| {})).join().unwrap();
        assert_eq!(outcome, Dispatch::Dropped);
    }
}
