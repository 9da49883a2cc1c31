use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[test]
fn publish_reaches_every_subscriber_in_order() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    let seen: Rc<RefCell<Vec<(u8, i32)>>> = Rc::default();

    let a = Rc::clone(&seen);
    bus.subscribe(move |v| a.borrow_mut().push((1, *v)));
    let b = Rc::clone(&seen);
    bus.subscribe(move |v| b.borrow_mut().push((2, *v)));

    bus.publish(&7);
    assert_eq!(*seen.borrow(), vec![(1, 7), (2, 7)]);
}

#[test]
fn unsubscribe_stops_delivery() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    let seen: Rc<RefCell<Vec<i32>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let sub = bus.subscribe(move |v| sink.borrow_mut().push(*v));

    bus.publish(&1);
    bus.unsubscribe(sub);
    bus.publish(&2);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn unsubscribe_unknown_id_is_ignored() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    let sub = bus.subscribe(|_| {});
    bus.unsubscribe(sub);
    bus.unsubscribe(sub);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn clear_tears_down_every_subscription() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    bus.subscribe(|_| {});
    bus.subscribe(|_| {});
    assert_eq!(bus.subscriber_count(), 2);
    bus.clear();
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn clones_share_one_subscriber_list() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    let other = bus.clone();
    let seen: Rc<RefCell<Vec<i32>>> = Rc::default();
    let sink = Rc::clone(&seen);
    bus.subscribe(move |v| sink.borrow_mut().push(*v));

    other.publish(&5);
    assert_eq!(*seen.borrow(), vec![5]);
}

#[test]
fn subscriber_may_unsubscribe_itself_during_publish() {
    let bus: Broadcaster<i32> = Broadcaster::new();
    let bus_handle = bus.clone();
    let slot: Rc<RefCell<Option<SubscriptionId>>> = Rc::default();
    let slot_handle = Rc::clone(&slot);
    let sub = bus.subscribe(move |_| {
        if let Some(id) = slot_handle.borrow_mut().take() {
            bus_handle.unsubscribe(id);
        }
    });
    *slot.borrow_mut() = Some(sub);

    bus.publish(&1);
    assert_eq!(bus.subscriber_count(), 0);
    bus.publish(&2);
}

#[test]
fn notice_constructors_set_level() {
    assert_eq!(Notice::info("ok").level, NoticeLevel::Info);
    assert_eq!(Notice::warn("hm").level, NoticeLevel::Warn);
    assert_eq!(Notice::info("ok").message, "ok");
}
