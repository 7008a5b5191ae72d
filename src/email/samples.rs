/// Built-in sample emails used when no Gmail credentials are configured
use chrono::{DateTime, TimeZone, Utc};

use super::common::Email;

fn received(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn sample_emails() -> Vec<Email> {
    vec![
        Email::new(
            "1234567890",
            "recruiting@stripe.com",
            "Interview scheduled - Frontend Engineer position",
            "Hi Athul,

Thank you for your interest in the Frontend Engineer position at Stripe. We'd like to schedule a technical interview with you.

Please let me know your availability for next week:
- Monday, July 8th at 2:00 PM PST
- Tuesday, July 9th at 10:00 AM PST
- Wednesday, July 10th at 3:00 PM PST

The interview will be conducted via Zoom and will last approximately 60 minutes. We'll cover technical questions and a coding exercise.

Looking forward to speaking with you!

Best regards,
Sarah Chen
Technical Recruiting Team
Stripe",
            received(2025, 7, 2, 10, 30),
        ),
        Email::new(
            "2345678901",
            "noreply@greenhouse.io",
            "Update on your application to Meta",
            "Dear Athul,

Thank you for your interest in the Software Engineer position at Meta and for taking the time to interview with our team.

After careful consideration, we have decided not to move forward with your application at this time. We received many strong applications and had to make difficult decisions.

We encourage you to apply for future opportunities that match your background and interests.

Thank you again for your time and interest in Meta.

Best regards,
Meta Recruiting Team",
            received(2025, 7, 1, 14, 15),
        ),
        Email::new(
            "3456789012",
            "careers@databricks.com",
            "Exciting news about your application!",
            "Hi Athul,

Congratulations! We are pleased to extend you an offer for the Senior Software Engineer position at Databricks.

Your interview performance was impressive and we believe you would be a great addition to our engineering team.

Offer details:
- Position: Senior Software Engineer
- Base Salary: $185,000
- Equity: Stock options
- Start Date: August 5, 2025

Please review the attached offer letter and let us know your decision by July 15th.

We're excited about the possibility of you joining our team!

Best regards,
Jennifer Lee
Talent Acquisition
Databricks",
            received(2025, 7, 1, 16, 45),
        ),
        Email::new(
            "4567890123",
            "recruiting@google.com",
            "Following up on your Google interview",
            "Hello Athul,

Thank you for taking the time to interview with us for the Software Engineer L5 position last week.

The team was impressed with your technical skills and problem-solving approach. We'd like to invite you to the next round of interviews.

Next steps:
1. Technical deep-dive with the engineering team (90 minutes)
2. System design interview (60 minutes)
3. Culture fit interview with the hiring manager (45 minutes)

Please let me know your availability for the week of July 14-18.

Best regards,
Michael Zhang
Google Recruiting",
            received(2025, 6, 30, 11, 20),
        ),
        Email::new(
            "5678901234",
            "jobs@airbnb.com",
            "Thank you for your interest in Airbnb",
            "Dear Athul,

Thank you for applying to the Full-Stack Engineer position at Airbnb. We appreciate the time you invested in our application process.

Unfortunately, we will not be moving forward with your candidacy for this particular role. We had an exceptional pool of candidates and difficult decisions to make.

We encourage you to keep an eye on our careers page for future opportunities that might be a better fit.

Thank you again for your interest in Airbnb.

Best,
Airbnb Talent Team",
            received(2025, 6, 29, 9, 10),
        ),
        Email::new(
            "6789012345",
            "recruiting@notion.so",
            "Interview feedback and next steps - Notion",
            "Hi Athul,

Thank you for the great conversation during your interview with the Notion engineering team yesterday.

The team was impressed with:
- Your React and TypeScript expertise
- Creative problem-solving approach
- Understanding of collaborative tools and user experience

We'd like to proceed with a final round interview with our VP of Engineering. This will be a 45-minute conversation focused on leadership and strategic thinking.

Are you available next Thursday, July 10th at 2 PM PST?

Looking forward to the next conversation!

Best,
Alex Kim
Engineering Recruiting
Notion",
            received(2025, 6, 28, 15, 30),
        ),
    ]
}
