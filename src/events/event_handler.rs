/// Consumer side for events delivered in batches, e.g. by [`super::EventQueue::dispatch`].
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);

    fn handle_events<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for event in events {
            self.handle_event(event);
        }
    }
}
