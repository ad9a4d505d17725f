//! User-facing reply texts (Russian).

pub const PHOTO_PLACEHOLDER: &str = "[Фото]";

pub fn welcome() -> String {
    "👋 Привет! Я записываю разговор в этом чате и могу рассказать, о чём вы тут болтали.\n\
     Список команд: /help"
        .to_string()
}

pub fn help() -> String {
    "🤖 *Команды*\n\n\
     /summary [часы] — резюме разговора (по умолчанию за 24 часа)\n\
     /stats — статистика сообщений\n\
     /top — рейтинг матерщинников\n\
     /mystats — твоя статистика мата\n\
     /quiz — викторина «Кто это сказал?»\n\
     /answer <номер> — ответ на викторину\n\
     /quiztop — рейтинг викторины\n\
     /ball — магический шар\n\
     /who [вопрос] — выбрать случайного участника\n\
     /rate <что-нибудь> — оценка от 1 до 10"
        .to_string()
}

pub fn private_hint() -> String {
    "👀 Я работаю в групповых чатах. Добавь меня в группу и набери /help.".to_string()
}

pub fn stats(messages_24h: i64, messages_7d: i64, total: i64) -> String {
    format!(
        "📈 *Статистика сообщений в чате*\n\n\
         За последние 24 часа: {messages_24h} сообщений\n\
         За последние 7 дней: {messages_7d} сообщений\n\
         Всего сохранено: {total} сообщений"
    )
}

pub fn summary_header(hours: u32) -> String {
    format!("📊 *Саммари разговора за последние {hours} часов*\n\n")
}

pub fn no_messages(hours: u32) -> String {
    format!("📭 За последние {hours} часов не было сообщений в этом чате.")
}

pub fn error_group_only() -> String {
    "❌ Эта команда работает только в группах!".to_string()
}

pub fn error_invalid_hours() -> String {
    "❌ Количество часов должно быть положительным числом!".to_string()
}

pub fn error_max_hours_exceeded(max_hours: u32) -> String {
    let days = max_hours / 24;
    format!("❌ Максимальный период для саммари - {max_hours} часов ({days} дней)")
}

pub fn error_invalid_format() -> String {
    "❌ Неверный формат! Используйте: /summary [часы]\nПример: /summary 24".to_string()
}

pub fn error_summary_generation(error: &str) -> String {
    format!("❌ Ошибка при генерации саммари: {error}")
}

pub fn error_stats_retrieval(error: &str) -> String {
    format!("❌ Ошибка при получении статистики: {error}")
}

pub fn error_not_enough_messages(count: usize) -> String {
    format!("❌ Йоу бро, {count} сообщений можно и самому прочитать")
}

// --- Profanity ---

pub fn profanity_top(rows: &[(String, i64, &str)]) -> String {
    if rows.is_empty() {
        return "😇 В этом чате все культурные. Пока что.".to_string();
    }
    let mut out = String::from("🤬 *Топ матерщинников*\n\n");
    for (i, (name, count, title)) in rows.iter().enumerate() {
        out.push_str(&format!("{}. {name} — {count} ({title})\n", i + 1));
    }
    out
}

pub fn my_profanity(name: &str, count: i64, title: &str) -> String {
    format!("🧾 {name}, твой счёт: {count}\nЗвание: {title}")
}

// --- Quiz ---

pub fn quiz_question(text: &str, date: &str, options: &[String]) -> String {
    let mut out = format!("💬 _{text}_\n\n🗓 Дата: {date}\n\n❓ *Кто это сказал?*\n\n");
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("{}. {option}\n", i + 1));
    }
    out.push_str("\nОтвет: /answer <номер>");
    out
}

pub fn quiz_no_messages() -> String {
    "🤷 Пока нет сообщений для викторины. Поговорите ещё!".to_string()
}

pub fn quiz_no_active() -> String {
    "🤔 Сейчас нет активной викторины. Начни новую: /quiz".to_string()
}

pub fn quiz_bad_answer(options: usize) -> String {
    format!("❌ Укажи номер от 1 до {options}, например: /answer 2")
}

pub fn quiz_correct(name: &str, answer: &str) -> String {
    format!("✅ {name}, верно! Это был(а) {answer}.")
}

pub fn quiz_wrong(name: &str, answer: &str) -> String {
    format!("❌ {name}, мимо! Правильный ответ: {answer}.")
}

pub fn quiz_top(rows: &[(String, i64, i64)]) -> String {
    if rows.is_empty() {
        return "🏆 Ещё никто не играл в викторину. /quiz".to_string();
    }
    let mut out = String::from("🏆 *Рейтинг викторины*\n\n");
    for (i, (name, correct, total)) in rows.iter().enumerate() {
        let pct = if *total > 0 { correct * 100 / total } else { 0 };
        out.push_str(&format!(
            "{}. {name} — {correct}/{total} ({pct}%)\n",
            i + 1
        ));
    }
    out
}

// --- Fun ---

pub const MAGIC_BALL_ANSWERS: &[&str] = &[
    "Бесспорно",
    "Предрешено",
    "Никаких сомнений",
    "Определённо да",
    "Можешь быть уверен в этом",
    "Мне кажется — да",
    "Вероятнее всего",
    "Хорошие перспективы",
    "Знаки говорят — да",
    "Да",
    "Пока не ясно, попробуй снова",
    "Спроси позже",
    "Лучше не рассказывать",
    "Сейчас нельзя предсказать",
    "Сконцентрируйся и спроси опять",
    "Даже не думай",
    "Мой ответ — нет",
    "По моим данным — нет",
    "Перспективы не очень хорошие",
    "Весьма сомнительно",
];

pub fn magic_ball(answer: &str) -> String {
    format!("🎱 {answer}")
}

pub fn nobody_here() -> String {
    "Никого нет в списке участников! 👻".to_string()
}

pub fn who(question: &str, name: &str) -> String {
    if question.is_empty() {
        format!("🎯 {name}")
    } else {
        format!("🎯 {question}\n👉 {name}")
    }
}

pub const RATING_LOW: &[&str] = &[
    "Ну такое...",
    "Бывало и лучше",
    "Даже не знаю, что сказать",
];
pub const RATING_MID: &[&str] = &["Сойдёт", "Неплохо, но можно лучше", "Средненько"];
pub const RATING_GOOD: &[&str] = &["Хорошо!", "Достойно", "Мне нравится"];
pub const RATING_TOP: &[&str] = &["Шедевр!", "Идеально!", "10 из 10, без вопросов"];

pub fn rate_usage() -> String {
    "❌ Что оценить? Пример: /rate пицца с ананасами".to_string()
}

pub fn rating(text: &str, score: u8, comment: &str) -> String {
    format!("⭐ {text}: {score}/10\n{comment}")
}
