use super::MessageKey::{self, *};

pub(super) const ENTRIES: &[(MessageKey, &str)] = &[
    (
        Start,
        "Этот бот проведёт вас через короткую анкету\n\n\
         Чтобы перейти к заполнению анкеты - отправьте команду /fillform",
    ),
    (
        CancelIdle,
        "Отменять нечего. Вы не заполняете анкету\n\n\
         Чтобы перейти к заполнению анкеты - отправьте команду /fillform",
    ),
    (
        CancelActive,
        "Вы прервали заполнение анкеты\n\n\
         Чтобы снова перейти к заполнению анкеты - отправьте команду /fillform",
    ),
    (FillForm, "Пожалуйста, введите ваше имя"),
    (ThankName, "Спасибо!\n\nА теперь введите ваш возраст"),
    (
        NotName,
        "То, что вы отправили, не похоже на имя\n\n\
         Пожалуйста, введите ваше имя\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (MaleGender, "Мужской ♂"),
    (FemaleGender, "Женский ♀"),
    (UnknownGender, "🤷 Пока не ясно"),
    (ThankAge, "Спасибо!\n\nУкажите ваш пол"),
    (
        NotAge,
        "Возраст должен быть целым числом от 4 до 120\n\n\
         Попробуйте еще раз\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (ThankGender, "Спасибо! А теперь загрузите, пожалуйста, ваше фото"),
    (
        NotGender,
        "Пожалуйста, пользуйтесь кнопками при выборе пола\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (SecondaryButton, "Среднее"),
    (HigherButton, "Высшее"),
    (NoEducationButton, "🤷 Нету"),
    (ThankPhoto, "Спасибо!\n\nУкажите ваше образование"),
    (
        NotPhoto,
        "Пожалуйста, на этом шаге отправьте ваше фото\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (Yes, "Да"),
    (No, "Нет"),
    (
        ThankEducation,
        "Спасибо!\n\nОстался последний шаг.\nХотели бы вы получать новости?",
    ),
    (
        NotEducation,
        "Пожалуйста, пользуйтесь кнопками при выборе образования\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (
        ThankNews,
        "Спасибо! Ваши данные сохранены!\n\n\
         Вы завершили заполнение анкеты",
    ),
    (
        NotNews,
        "Пожалуйста, воспользуйтесь кнопками!\n\n\
         Если вы хотите прервать заполнение анкеты - отправьте команду /cancel",
    ),
    (
        ShowDataHint,
        "Чтобы посмотреть данные вашей анкеты - отправьте команду /showdata",
    ),
    (
        NoProfile,
        "Вы еще не заполняли анкету. Чтобы приступить - отправьте команду /fillform",
    ),
    (NotUnderstood, "Извините, я вас не понимаю"),
    (
        InternalError,
        "Что-то пошло не так. Пожалуйста, попробуйте позже",
    ),
    (SummaryName, "Имя"),
    (SummaryAge, "Возраст"),
    (SummaryGender, "Пол"),
    (SummaryEducation, "Образование"),
    (SummaryWishNews, "Получать новости"),
    (CommandStart, "Начало работы с ботом"),
    (CommandCancel, "Прервать заполнение анкеты"),
    (CommandFillForm, "Заполнить анкету"),
    (CommandShowData, "Показать ваши данные"),
];
