use super::MessageKey::{self, *};

pub(super) const ENTRIES: &[(MessageKey, &str)] = &[
    (
        Start,
        "This bot walks you through a short questionnaire.\n\n\
         To start filling it out, send the /fillform command",
    ),
    (
        CancelIdle,
        "There is nothing to cancel. You are not filling out the questionnaire\n\n\
         To start filling it out, send the /fillform command",
    ),
    (
        CancelActive,
        "You have left the questionnaire\n\n\
         To start over, send the /fillform command",
    ),
    (FillForm, "Please enter your name"),
    (ThankName, "Thank you!\n\nAnd now enter your age"),
    (
        NotName,
        "That doesn't look like a name\n\n\
         Please enter your name\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (MaleGender, "Male ♂"),
    (FemaleGender, "Female ♀"),
    (UnknownGender, "🤷 Not sure yet"),
    (ThankAge, "Thanks!\n\nPlease specify your gender"),
    (
        NotAge,
        "Age must be a whole number from 4 to 120\n\n\
         Try again\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (ThankGender, "Thank you! And now, please upload your photo"),
    (
        NotGender,
        "Please use the buttons to choose your gender\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (SecondaryButton, "Secondary"),
    (HigherButton, "Higher"),
    (NoEducationButton, "🤷 None"),
    (ThankPhoto, "Thank you!\n\nPlease specify your education"),
    (
        NotPhoto,
        "Please send your photo at this step\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (Yes, "Yes"),
    (No, "No"),
    (
        ThankEducation,
        "Thank you!\n\nOne last step.\nWould you like to receive news?",
    ),
    (
        NotEducation,
        "Please use the buttons to choose your education\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (
        ThankNews,
        "Thank you! Your answers have been saved!\n\n\
         You have finished the questionnaire",
    ),
    (
        NotNews,
        "Please use the buttons!\n\n\
         To stop filling out the questionnaire, send the /cancel command",
    ),
    (
        ShowDataHint,
        "To see your questionnaire, send the /showdata command",
    ),
    (
        NoProfile,
        "You haven't filled out the questionnaire yet. \
         To start, send the /fillform command",
    ),
    (NotUnderstood, "Sorry, I don't understand"),
    (
        InternalError,
        "Something went wrong on our side. Please try again later",
    ),
    (SummaryName, "Name"),
    (SummaryAge, "Age"),
    (SummaryGender, "Gender"),
    (SummaryEducation, "Education"),
    (SummaryWishNews, "Receive news"),
    (CommandStart, "Start using the bot"),
    (CommandCancel, "Leave the questionnaire"),
    (CommandFillForm, "Fill out the questionnaire"),
    (CommandShowData, "Show your answers"),
];
