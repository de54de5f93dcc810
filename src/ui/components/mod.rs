pub mod completion;
pub mod explanation_slide;
pub mod home;
pub mod progress_bar;
pub mod question_card;
