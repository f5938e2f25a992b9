//! Coping strategy suggestions shown after an analysis
//!
//! Band selection uses the mean of stress and anxiety: above 60 is high,
//! 40 to 60 inclusive is moderate, below 40 is low. Targeted strategies are
//! added when one score leads the other by more than 15, or when the mood
//! mentions sadness. The list is stable-sorted by priority and cut to four.

use serde::Serialize;

/// Maximum strategies returned
pub const MAX_STRATEGIES: usize = 4;

/// One score must exceed the other by more than this to add a targeted strategy
const IMBALANCE_MARGIN: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopingStrategy {
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
    pub icon: &'static str,
    pub priority: Priority,
    /// Client can run it in-app (the breathing timer)
    pub interactive: bool,
}

const fn strategy(
    icon: &'static str,
    title: &'static str,
    description: &'static str,
    action: &'static str,
    priority: Priority,
) -> CopingStrategy {
    CopingStrategy {
        title,
        description,
        action,
        icon,
        priority,
        interactive: false,
    }
}

const DEEP_BREATHING: CopingStrategy = CopingStrategy {
    interactive: true,
    ..strategy(
        "\u{1FAC1}",
        "Deep Breathing Exercise",
        "Try the 4-7-8 technique: Breathe in for 4 counts, hold for 7, exhale for 8. Repeat 3-4 times.",
        "Start Breathing",
        Priority::High,
    )
};

const HIGH_BAND: [CopingStrategy; 3] = [
    DEEP_BREATHING,
    strategy(
        "\u{1F6B6}",
        "Take a Walk",
        "A 10-minute walk can significantly reduce stress hormones and clear your mind.",
        "Go for a Walk",
        Priority::High,
    ),
    strategy(
        "\u{1F3B5}",
        "Listen to Calming Music",
        "Classical or nature sounds can lower heart rate and reduce anxiety within minutes.",
        "Play Music",
        Priority::High,
    ),
];

const MODERATE_BAND: [CopingStrategy; 3] = [
    strategy(
        "\u{1F4DD}",
        "Practice Gratitude",
        "Write down 3 things you're grateful for today. This shifts focus to positive aspects.",
        "Start Writing",
        Priority::Medium,
    ),
    strategy(
        "\u{2615}",
        "Take a Mindful Break",
        "Step away from your tasks for 5-10 minutes. Stretch, hydrate, or enjoy a cup of tea.",
        "Take Break",
        Priority::Medium,
    ),
    strategy(
        "\u{1F9D8}",
        "Quick Meditation",
        "A 5-minute guided meditation can help center your thoughts and reduce tension.",
        "Meditate Now",
        Priority::Medium,
    ),
];

const LOW_BAND: [CopingStrategy; 3] = [
    strategy(
        "\u{2728}",
        "You're Doing Great!",
        "Your stress and anxiety levels are healthy. Keep up with your self-care routine.",
        "Keep Going",
        Priority::Low,
    ),
    strategy(
        "\u{1F4DA}",
        "Learn Something New",
        "You're in a good headspace to explore new interests or practice a skill you enjoy.",
        "Explore",
        Priority::Low,
    ),
    strategy(
        "\u{1F91D}",
        "Connect with Others",
        "Reach out to a friend or loved one. Positive social connections boost well-being.",
        "Connect",
        Priority::Low,
    ),
];

const GROUNDING: CopingStrategy = strategy(
    "\u{1F9E0}",
    "Ground Yourself (5-4-3-2-1)",
    "Name 5 things you see, 4 you feel, 3 you hear, 2 you smell, 1 you taste. This anchors you to the present.",
    "Try Grounding",
    Priority::High,
);

const PRIORITIZE: CopingStrategy = strategy(
    "\u{1F4C5}",
    "Prioritize Tasks",
    "Break down overwhelming tasks into smaller steps. Focus on one thing at a time.",
    "Make a List",
    Priority::High,
);

const SUNLIGHT: CopingStrategy = strategy(
    "\u{1F31E}",
    "Get Some Sunlight",
    "Natural light boosts serotonin. Try spending 15 minutes outside or by a window.",
    "Go Outside",
    Priority::Medium,
);

/// Pick up to four strategies for an analysis result
pub fn suggest(stress: u8, anxiety: u8, mood: &str) -> Vec<CopingStrategy> {
    let stress = u16::from(stress);
    let anxiety = u16::from(anxiety);
    // Compare the sum against doubled bounds to keep the half-points exact
    let total = stress + anxiety;

    let mut picks: Vec<CopingStrategy> = Vec::new();
    if total > 120 {
        picks.extend(HIGH_BAND);
    } else if total >= 80 {
        picks.extend(MODERATE_BAND);
    } else {
        picks.extend(LOW_BAND);
    }

    if anxiety > stress + IMBALANCE_MARGIN {
        picks.push(GROUNDING);
    }
    if stress > anxiety + IMBALANCE_MARGIN {
        picks.push(PRIORITIZE);
    }
    if mood.to_lowercase().contains("sad") {
        picks.push(SUNLIGHT);
    }

    picks.sort_by_key(|s| s.priority);
    picks.truncate(MAX_STRATEGIES);
    picks
}
