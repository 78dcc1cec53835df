//! Fixed quick-reply labels offered under the conversation.

/// Labels in display order. Each label is sent verbatim as a user message.
pub const QUICK_REPLIES: [&str; 5] = [
    "course registration period",
    "Course Information",
    "Timetable Generation",
    "Study Plan Guidance",
    "FAQs",
];

/// Label at a one-based position, as shown to the user.
#[must_use]
pub fn quick_reply(position: usize) -> Option<&'static str> {
    position
        .checked_sub(1)
        .and_then(|index| QUICK_REPLIES.get(index))
        .copied()
}
