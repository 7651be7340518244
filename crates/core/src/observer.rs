/// Receives events from a solver or training loop.
///
/// An observer may return an action to steer the caller, such as stopping
/// early. Returning `None` lets the caller proceed normally.
///
/// The unit type `()` is a no-op observer, and any `FnMut(&E) -> Option<A>`
/// closure is an observer.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Stop;

    fn drive<O: Observer<usize, Stop>>(mut observer: O, events: usize) -> usize {
        for event in 0..events {
            if observer.observe(&event).is_some() {
                return event;
            }
        }
        events
    }

    #[test]
    fn unit_never_acts() {
        assert_eq!(drive((), 10), 10);
    }

    #[test]
    fn closure_can_act() {
        assert_eq!(drive(|e: &usize| (*e == 3).then_some(Stop), 10), 3);
    }
}
