//! Scenario tests driving the scene through the engine frame loop

mod end_to_end;
