/// Screens of the app. Navigation only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Welcome page shown at launch
    #[default]
    Intro,
    /// Search box and results grid
    Search,
}

impl Screen {
    pub fn initial(skip_intro: bool) -> Self {
        if skip_intro {
            Screen::Search
        } else {
            Screen::Intro
        }
    }

    /// Leave the intro. There is no way back from the search screen.
    pub fn start(self) -> Self {
        Screen::Search
    }
}
