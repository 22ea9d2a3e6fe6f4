// implemented by listeners holding subscriptions; dropping them does not detach from the channel,
// so callers break the link explicitly
pub trait Destroyable {
    fn destroy(&mut self);
}
